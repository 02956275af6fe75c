//! Price component (publisher) quality records and table ordering

use crate::core::search;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use tracing::debug;

/// One publisher's quality scores for a price feed, as reported by the
/// dashboard backend. Scores are unitless; penalties may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComponent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub score: f64,
    pub uptime_score: f64,
    pub deviation_score: f64,
    #[serde(default)]
    pub deviation_penalty: Option<f64>,
    pub stalled_score: f64,
    pub stalled_penalty: f64,
}

impl PriceComponent {
    /// Name shown in tables and used for name ordering; falls back to the
    /// id when the backend supplied no display name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Search matches against the id or the display name (when present),
    /// ignoring case and diacritics. An empty search matches everything.
    pub fn matches_search(&self, search: &str) -> bool {
        search.is_empty()
            || search::contains(&self.id, search)
            || self
                .name
                .as_deref()
                .is_some_and(|name| search::contains(name, search))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Score,
    Name,
    UptimeScore,
    DeviationScore,
    DeviationPenalty,
    StalledScore,
    StalledPenalty,
}

impl SortColumn {
    /// Parses a sort column restored from query state. Unrecognized values
    /// fall back to `Score` instead of failing the whole view. Accepts
    /// camelCase, kebab-case and snake_case spellings.
    pub fn from_query(value: &str) -> Self {
        let normalized: String = value
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "" | "score" => SortColumn::Score,
            "name" => SortColumn::Name,
            "uptimescore" => SortColumn::UptimeScore,
            "deviationscore" => SortColumn::DeviationScore,
            "deviationpenalty" => SortColumn::DeviationPenalty,
            "stalledscore" => SortColumn::StalledScore,
            "stalledpenalty" => SortColumn::StalledPenalty,
            _ => {
                debug!("Unrecognized sort column '{value}', falling back to score");
                SortColumn::Score
            }
        }
    }

    /// The kebab-case form used on the command line and in page links.
    pub fn as_query(&self) -> &'static str {
        match self {
            SortColumn::Score => "score",
            SortColumn::Name => "name",
            SortColumn::UptimeScore => "uptime-score",
            SortColumn::DeviationScore => "deviation-score",
            SortColumn::DeviationPenalty => "deviation-penalty",
            SortColumn::StalledScore => "stalled-score",
            SortColumn::StalledPenalty => "stalled-penalty",
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort of the components table: one column plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn new(column: SortColumn, descending: bool) -> Self {
        Self {
            column,
            direction: if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }

    /// Compares two components under this descriptor.
    ///
    /// Numeric columns compare by value. Names compare case- and
    /// diacritic-insensitively on the display name. A missing deviation
    /// penalty orders after every present one in ascending order; the
    /// direction flip applies to the whole result, missing values included.
    pub fn compare(&self, a: &PriceComponent, b: &PriceComponent) -> Ordering {
        let ordering = match self.column {
            SortColumn::Score => a.score.total_cmp(&b.score),
            SortColumn::Name => search::collate(a.display_name(), b.display_name()),
            SortColumn::UptimeScore => a.uptime_score.total_cmp(&b.uptime_score),
            SortColumn::DeviationScore => a.deviation_score.total_cmp(&b.deviation_score),
            SortColumn::DeviationPenalty => match (a.deviation_penalty, b.deviation_penalty) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => x.total_cmp(&y),
            },
            SortColumn::StalledScore => a.stalled_score.total_cmp(&b.stalled_score),
            SortColumn::StalledPenalty => a.stalled_penalty.total_cmp(&b.stalled_penalty),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}
