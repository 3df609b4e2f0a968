use crate::error::AnalyticsError;
use crate::types::{ObservationPoint, SummaryStats};

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean and population standard deviation (denominator `n`).
pub fn summary_stats(values: &[f64]) -> Result<SummaryStats, AnalyticsError> {
    let mean = mean(values).ok_or(AnalyticsError::EmptyInput)?;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;

    Ok(SummaryStats {
        mean,
        volatility: variance.sqrt(),
    })
}

/// [`summary_stats`] over the quantities of a series.
pub fn series_summary(points: &[ObservationPoint]) -> Result<SummaryStats, AnalyticsError> {
    let quantities: Vec<f64> = points.iter().map(|p| p.quantity).collect();
    summary_stats(&quantities)
}
