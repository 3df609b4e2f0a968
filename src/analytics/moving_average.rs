use crate::analytics::round2;
use crate::error::AnalyticsError;
use crate::types::{EnrichedPoint, ObservationPoint};

/// Trailing mean over `window` values ending at each index.
///
/// The first `window - 1` outputs average over however much history exists;
/// there is no zero padding and no wrap. The divisor is always the actual
/// slice length. Output is rounded to 2 decimals.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<f64>, AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindow);
    }

    Ok((0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            round2(slice.iter().sum::<f64>() / slice.len() as f64)
        })
        .collect())
}

/// Attach a trailing moving average of `quantity` to every point.
/// Points must already be in chronological order.
pub fn enrich(points: &[ObservationPoint], window: usize) -> Result<Vec<EnrichedPoint>, AnalyticsError> {
    let quantities: Vec<f64> = points.iter().map(|p| p.quantity).collect();
    let averages = moving_average(&quantities, window)?;

    Ok(points
        .iter()
        .zip(averages)
        .map(|(p, moving_average)| EnrichedPoint {
            point: p.clone(),
            moving_average,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    const SERIES: [f64; 10] = [3.0, 4.0, 5.0, 8.0, 9.0, 6.0, 4.0, 5.0, 3.0, 2.0];

    fn points(values: &[f64]) -> Vec<ObservationPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &q)| ObservationPoint::new(start + Duration::days(i as i64), q))
            .collect()
    }

    #[test]
    fn reference_series_weekly_window() {
        let ma = moving_average(&SERIES, 7).unwrap();
        assert_eq!(ma.len(), SERIES.len());
        assert_eq!(ma[0], 3.00);
        assert_eq!(ma[1], 3.50);
        assert_eq!(ma[6], 5.57);
        assert_eq!(ma[9], 5.29);
    }

    #[test]
    fn short_series_uses_shrinking_window() {
        let values = [2.0, 4.0, 9.0];
        let ma = moving_average(&values, 7).unwrap();
        assert_eq!(ma, vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn constant_series_averages_to_itself() {
        let ma = moving_average(&[4.25; 12], 7).unwrap();
        assert!(ma.iter().all(|&v| v == 4.25));
    }

    #[test]
    fn window_of_one_is_identity_after_rounding() {
        let ma = moving_average(&[1.234, 5.678], 1).unwrap();
        assert_eq!(ma, vec![1.23, 5.68]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(moving_average(&[], 7).unwrap().is_empty());
        assert!(enrich(&[], 7).unwrap().is_empty());
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(moving_average(&SERIES, 0), Err(AnalyticsError::InvalidWindow));
    }

    #[test]
    fn enrich_keeps_points_and_order() {
        let pts = points(&SERIES);
        let enriched = enrich(&pts, 7).unwrap();
        assert_eq!(enriched.len(), pts.len());
        for (e, p) in enriched.iter().zip(pts.iter()) {
            assert_eq!(&e.point, p);
        }
        assert_eq!(enriched[6].moving_average, 5.57);
    }
}
