//! Components table derivation: filter, sort and paginate

use crate::core::component::{PriceComponent, SortDescriptor};

/// Page sizes the paginator offers.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// The filtered and sorted view over a feed's price components.
///
/// Filtering happens before sorting, and pagination applies to the result,
/// so the result count and page count always describe the filtered set.
#[derive(Debug, Clone)]
pub struct ComponentTable {
    rows: Vec<PriceComponent>,
}

impl ComponentTable {
    pub fn new(components: &[PriceComponent], search: &str, sort: &SortDescriptor) -> Self {
        let mut rows: Vec<PriceComponent> = components
            .iter()
            .filter(|c| c.matches_search(search))
            .cloned()
            .collect();
        // sort_by is stable, so rows the comparator ties keep their
        // incoming order and repeated derivations agree.
        rows.sort_by(|a, b| sort.compare(a, b));
        Self { rows }
    }

    pub fn num_results(&self) -> usize {
        self.rows.len()
    }

    pub fn num_pages(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.rows.len().div_ceil(page_size)
    }

    /// Rows of the 1-indexed `page`. Pages outside `1..=num_pages` are
    /// empty rather than an error.
    pub fn page(&self, page: usize, page_size: usize) -> &[PriceComponent] {
        if page == 0 || page_size == 0 {
            return &[];
        }
        let start = (page - 1) * page_size;
        if start >= self.rows.len() {
            return &[];
        }
        let end = (start + page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

/// Clamps a requested page into the valid range, mirroring how the view
/// resets an out-of-range page restored from query state. An empty table
/// clamps to page 1.
pub fn clamp_page(page: usize, num_pages: usize) -> usize {
    page.clamp(1, num_pages.max(1))
}
