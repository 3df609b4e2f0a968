use crate::analytics::stats::series_summary;
use crate::error::AnalyticsError;
use crate::types::{ObservationPoint, Spike};

/// Points whose z-score exceeds `threshold`, strongest first.
///
/// A flat series (zero volatility) has no spikes.
pub fn detect_spikes(points: &[ObservationPoint], threshold: f64) -> Result<Vec<Spike>, AnalyticsError> {
    let stats = series_summary(points)?;
    if stats.volatility == 0.0 {
        return Ok(Vec::new());
    }

    let mut spikes: Vec<Spike> = points
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let z_score = (p.quantity - stats.mean) / stats.volatility;
            (z_score > threshold).then(|| Spike {
                index,
                date: p.date,
                quantity: p.quantity,
                z_score,
            })
        })
        .collect();

    // stable: equal scores stay chronological
    spikes.sort_by(|a, b| b.z_score.total_cmp(&a.z_score));
    Ok(spikes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn points(values: &[f64]) -> Vec<ObservationPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &q)| ObservationPoint::new(start + Duration::days(i as i64), q))
            .collect()
    }

    #[test]
    fn finds_single_outlier() {
        let mut values = vec![10.0; 19];
        values.push(40.0);
        let spikes = detect_spikes(&points(&values), 2.0).unwrap();
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].index, 19);
        assert_eq!(spikes[0].quantity, 40.0);
        assert!(spikes[0].z_score > 4.0);
    }

    #[test]
    fn strongest_first() {
        let mut values = vec![5.0; 30];
        values[4] = 30.0;
        values[20] = 45.0;
        let spikes = detect_spikes(&points(&values), 2.0).unwrap();
        let idx: Vec<usize> = spikes.iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![20, 4]);
    }

    #[test]
    fn flat_series_has_none() {
        assert!(detect_spikes(&points(&[3.0; 8]), 2.0).unwrap().is_empty());
    }

    #[test]
    fn empty_is_no_data() {
        assert_eq!(detect_spikes(&[], 2.0), Err(AnalyticsError::EmptyInput));
    }
}
