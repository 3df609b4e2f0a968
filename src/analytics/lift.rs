use crate::analytics::stats::mean;
use crate::error::{AnalyticsError, Partition};
use crate::types::{Lift, ObservationPoint};

/// Percentage difference of the flagged-period mean over the unflagged mean,
/// rounded to a whole percent (halves round up).
///
/// Both partitions must be non-empty and the unflagged mean large enough for
/// the percentage to fit in an `i64`, otherwise the comparison is reported as
/// not applicable.
pub fn festival_lift(points: &[ObservationPoint]) -> Result<Lift, AnalyticsError> {
    if points.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let (flagged, unflagged): (Vec<&ObservationPoint>, Vec<&ObservationPoint>) =
        points.iter().partition(|p| p.flag);

    let flagged: Vec<f64> = flagged.iter().map(|p| p.quantity).collect();
    let unflagged: Vec<f64> = unflagged.iter().map(|p| p.quantity).collect();

    let flagged_mean =
        mean(&flagged).ok_or(AnalyticsError::DegenerateComparison(Partition::Flagged))?;
    let unflagged_mean =
        mean(&unflagged).ok_or(AnalyticsError::DegenerateComparison(Partition::Unflagged))?;

    if unflagged_mean == 0.0 {
        return Err(AnalyticsError::DegenerateComparison(Partition::ZeroBaseline));
    }

    let ratio = (flagged_mean - unflagged_mean) / unflagged_mean * 100.0;
    let percent = (ratio + 0.5).floor();
    // a near-zero baseline blows the ratio past anything an i64 percent can hold
    if !percent.is_finite() || percent < i64::MIN as f64 || percent >= i64::MAX as f64 {
        return Err(AnalyticsError::DegenerateComparison(Partition::ZeroBaseline));
    }

    Ok(Lift {
        flagged_mean,
        unflagged_mean,
        percent: percent as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(cases: &[(f64, bool)]) -> Vec<ObservationPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 10, 20).unwrap();
        cases
            .iter()
            .enumerate()
            .map(|(i, &(q, flag))| ObservationPoint {
                date: start + Duration::days(i as i64),
                quantity: q,
                flag,
            })
            .collect()
    }

    #[test]
    fn positive_lift() {
        let pts = series(&[(10.0, false), (10.0, false), (15.0, true), (15.0, true)]);
        let lift = festival_lift(&pts).unwrap();
        assert_eq!(lift.flagged_mean, 15.0);
        assert_eq!(lift.unflagged_mean, 10.0);
        assert_eq!(lift.percent, 50);
    }

    #[test]
    fn negative_lift_rounds_half_up() {
        let pts = series(&[(10.0, false), (7.5, true)]);
        assert_eq!(festival_lift(&pts).unwrap().percent, -25);

        // -12.5% and +12.5%
        let pts = series(&[(8.0, false), (7.0, true)]);
        assert_eq!(festival_lift(&pts).unwrap().percent, -12);
        let pts = series(&[(8.0, false), (9.0, true)]);
        assert_eq!(festival_lift(&pts).unwrap().percent, 13);
    }

    #[test]
    fn rounds_to_nearest_percent() {
        // 13 / 9 - 1 = 44.44%
        let pts = series(&[(9.0, false), (13.0, true)]);
        assert_eq!(festival_lift(&pts).unwrap().percent, 44);
    }

    #[test]
    fn all_unflagged_is_not_applicable() {
        let pts = series(&[(3.0, false), (4.0, false)]);
        assert_eq!(
            festival_lift(&pts),
            Err(AnalyticsError::DegenerateComparison(Partition::Flagged))
        );
    }

    #[test]
    fn all_flagged_is_not_applicable() {
        let pts = series(&[(3.0, true), (4.0, true)]);
        assert_eq!(
            festival_lift(&pts),
            Err(AnalyticsError::DegenerateComparison(Partition::Unflagged))
        );
    }

    #[test]
    fn zero_baseline_is_not_applicable() {
        let pts = series(&[(0.0, false), (0.0, false), (5.0, true)]);
        assert_eq!(
            festival_lift(&pts),
            Err(AnalyticsError::DegenerateComparison(Partition::ZeroBaseline))
        );
    }

    #[test]
    fn vanishing_baseline_is_not_applicable() {
        let pts = series(&[(1e-300, false), (5.0, true)]);
        assert_eq!(
            festival_lift(&pts),
            Err(AnalyticsError::DegenerateComparison(Partition::ZeroBaseline))
        );

        let pts = series(&[(1e-300, false), (-5.0, true)]);
        assert_eq!(
            festival_lift(&pts),
            Err(AnalyticsError::DegenerateComparison(Partition::ZeroBaseline))
        );
    }

    #[test]
    fn empty_is_no_data() {
        assert_eq!(festival_lift(&[]), Err(AnalyticsError::EmptyInput));
    }
}
