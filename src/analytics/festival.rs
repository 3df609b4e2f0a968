use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{FESTIVAL_LEAD_DAYS, FESTIVAL_TRAIL_DAYS};
use crate::types::ObservationPoint;

/// Days around a festival date that count as the festival period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FestivalWindow {
    pub lead_days: i64,
    pub trail_days: i64,
}

impl Default for FestivalWindow {
    fn default() -> Self {
        Self {
            lead_days: FESTIVAL_LEAD_DAYS,
            trail_days: FESTIVAL_TRAIL_DAYS,
        }
    }
}

impl FestivalWindow {
    /// Inclusive `[festival - lead, festival + trail]`, clamped to the
    /// representable date range.
    pub fn contains(&self, festival: NaiveDate, date: NaiveDate) -> bool {
        let start = Duration::try_days(self.lead_days)
            .and_then(|d| festival.checked_sub_signed(d))
            .unwrap_or(NaiveDate::MIN);
        let end = Duration::try_days(self.trail_days)
            .and_then(|d| festival.checked_add_signed(d))
            .unwrap_or(NaiveDate::MAX);
        start <= date && date <= end
    }
}

/// Copy of `points` with `flag` set on every point inside a festival window.
/// Existing flags are kept; order is unchanged.
pub fn flag_festival_windows(
    points: &[ObservationPoint],
    festivals: &[NaiveDate],
    window: FestivalWindow,
) -> Vec<ObservationPoint> {
    points
        .iter()
        .map(|p| ObservationPoint {
            flag: p.flag || festivals.iter().any(|&f| window.contains(f, p.date)),
            ..p.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(start: NaiveDate, days: i64) -> Vec<ObservationPoint> {
        (0..days)
            .map(|i| ObservationPoint::new(start + Duration::days(i), 1.0))
            .collect()
    }

    #[test]
    fn window_is_seven_before_three_after() {
        let diwali = ymd(2024, 11, 1);
        let w = FestivalWindow::default();
        assert!(!w.contains(diwali, ymd(2024, 10, 24)));
        assert!(w.contains(diwali, ymd(2024, 10, 25)));
        assert!(w.contains(diwali, diwali));
        assert!(w.contains(diwali, ymd(2024, 11, 4)));
        assert!(!w.contains(diwali, ymd(2024, 11, 5)));
    }

    #[test]
    fn flags_only_points_inside_any_window() {
        let pts = daily(ymd(2024, 10, 20), 20);
        let out = flag_festival_windows(&pts, &[ymd(2024, 11, 1)], FestivalWindow::default());

        assert_eq!(out.len(), pts.len());
        let flagged: Vec<NaiveDate> = out.iter().filter(|p| p.flag).map(|p| p.date).collect();
        assert_eq!(flagged.first(), Some(&ymd(2024, 10, 25)));
        assert_eq!(flagged.last(), Some(&ymd(2024, 11, 4)));
        assert_eq!(flagged.len(), 11);
        assert!(pts.iter().all(|p| !p.flag), "input must not be mutated");
    }

    #[test]
    fn window_near_calendar_end_is_clamped() {
        let w = FestivalWindow::default();
        let festival = NaiveDate::MAX.pred_opt().unwrap();
        assert!(w.contains(festival, NaiveDate::MAX));
        assert!(w.contains(festival, festival - Duration::days(7)));
        assert!(!w.contains(festival, festival - Duration::days(8)));

        let first = NaiveDate::MIN.succ_opt().unwrap();
        assert!(w.contains(first, NaiveDate::MIN));
        assert!(!w.contains(first, first + Duration::days(4)));
    }

    #[test]
    fn far_future_festival_flags_without_panicking() {
        let festival: NaiveDate = serde_json::from_str("\"+262142-12-30\"").unwrap();
        let mut pts = daily(ymd(2024, 10, 1), 3);
        pts.push(ObservationPoint::new(festival, 2.0));

        let out = flag_festival_windows(&pts, &[festival], FestivalWindow::default());
        assert_eq!(out.iter().map(|p| p.flag).collect::<Vec<_>>(), vec![false, false, false, true]);
    }

    #[test]
    fn huge_window_covers_everything() {
        let w = FestivalWindow { lead_days: i64::MAX, trail_days: i64::MAX };
        let diwali = ymd(2024, 11, 1);
        assert!(w.contains(diwali, NaiveDate::MIN));
        assert!(w.contains(diwali, NaiveDate::MAX));
    }

    #[test]
    fn existing_flags_survive() {
        let mut pts = daily(ymd(2024, 1, 1), 3);
        pts[0].flag = true;
        let out = flag_festival_windows(&pts, &[], FestivalWindow::default());
        assert_eq!(out.iter().map(|p| p.flag).collect::<Vec<_>>(), vec![true, false, false]);
    }
}
