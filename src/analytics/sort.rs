use serde::{Deserialize, Serialize};

use crate::analytics::search::filter_rows;
use crate::types::ResultRow;

/// Three-state sort on `days_left`. The current mode is caller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "none", alias = "unsorted")]
    Unsorted,
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl SortMode {
    /// none → asc → desc → none
    pub fn toggle(self) -> Self {
        match self {
            SortMode::Unsorted => SortMode::Ascending,
            SortMode::Ascending => SortMode::Descending,
            SortMode::Descending => SortMode::Unsorted,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortMode::Unsorted => "",
            SortMode::Ascending => "↑",
            SortMode::Descending => "↓",
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SortMode::Unsorted => "none",
            SortMode::Ascending => "asc",
            SortMode::Descending => "desc",
        };
        write!(f, "{s}")
    }
}

/// Stable sort by `days_left`. `Unsorted` keeps the incoming order.
pub fn sort_rows<'a, I>(rows: I, mode: SortMode) -> Vec<&'a ResultRow>
where
    I: IntoIterator<Item = &'a ResultRow>,
{
    let mut out: Vec<&ResultRow> = rows.into_iter().collect();
    match mode {
        SortMode::Unsorted => {}
        SortMode::Ascending => out.sort_by(|a, b| a.days_left.cmp(&b.days_left)),
        SortMode::Descending => out.sort_by(|a, b| b.days_left.cmp(&a.days_left)),
    }
    out
}

/// Search then sort: the view a results table shows.
pub fn apply_view<'a>(rows: &'a [ResultRow], query: &str, mode: SortMode) -> Vec<&'a ResultRow> {
    sort_rows(filter_rows(rows, query), mode)
}
