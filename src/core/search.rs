//! Base-sensitivity text matching for table search and name collation
//!
//! "Base" sensitivity means case and diacritics are ignored: a search for
//! "cafe" matches "Café123". Matching folds both sides to NFKD, strips
//! combining marks and lowercases the remainder.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Folds a string to its base characters: NFKD decomposition, combining
/// marks removed, lowercased.
pub fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Substring containment under base sensitivity. An empty needle matches
/// everything.
pub fn contains(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

/// Orders two strings by their folded form, falling back to a codepoint
/// comparison so unequal inputs never collate as equal.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}
