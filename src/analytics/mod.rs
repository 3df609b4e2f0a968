//! Pure analytics over forecast rows and sales series.
//!
//! Nothing here keeps state between calls or performs I/O; every function
//! reads its input and returns a freshly allocated result.

pub mod festival;
pub mod insights;
pub mod lift;
pub mod moving_average;
pub mod search;
pub mod sort;
pub mod spikes;
pub mod stats;

pub use festival::{flag_festival_windows, FestivalWindow};
pub use insights::{analyze_series, InsightsConfig};
pub use lift::festival_lift;
pub use moving_average::{enrich, moving_average};
pub use search::{filter_rows, row_matches};
pub use sort::{apply_view, sort_rows, SortMode};
pub use spikes::detect_spikes;
pub use stats::{series_summary, summary_stats};

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
