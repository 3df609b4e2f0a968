use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{detect_spikes, enrich, festival_lift, series_summary};
use crate::config::{DEFAULT_MOVING_AVERAGE_WINDOW, DEFAULT_SPIKE_Z_THRESHOLD};
use crate::error::AnalyticsError;
use crate::types::{ObservationPoint, SeriesInsights};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    pub window: usize,
    pub spike_threshold: f64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_MOVING_AVERAGE_WINDOW,
            spike_threshold: DEFAULT_SPIKE_Z_THRESHOLD,
        }
    }
}

/// Run every series statistic independently over `points`.
///
/// "No data" and "not applicable" become `None` or an empty list. Only an
/// unusable window size is an error.
pub fn analyze_series(points: &[ObservationPoint], cfg: &InsightsConfig) -> Result<SeriesInsights, AnalyticsError> {
    let enriched = enrich(points, cfg.window)?;

    let summary = series_summary(points).ok();
    let festival_lift = match festival_lift(points) {
        Ok(lift) => Some(lift),
        Err(reason) => {
            debug!(points = points.len(), "festival lift skipped: {reason}");
            None
        }
    };
    let spikes = detect_spikes(points, cfg.spike_threshold).unwrap_or_default();

    Ok(SeriesInsights {
        enriched,
        summary,
        festival_lift,
        spikes,
    })
}
