//! Snapshot metrics and period-over-period variation
//!
//! Every function here is total: an empty view or a zero baseline resolves to a
//! well-defined value rather than an error or NaN.

use serde::Serialize;
use std::collections::HashSet;

use crate::filter::FilteredView;

/// The four headline scalars over one filtered view
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub count: usize,
    pub distinct_units: usize,
    pub total_amount: f64,
    pub mean_return: f64,
}

/// Percentage change per snapshot metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SnapshotVariation {
    pub count: f64,
    pub distinct_units: f64,
    pub total_amount: f64,
    pub mean_return: f64,
}

impl Snapshot {
    /// Variation of `self` relative to `baseline`.
    pub fn variation_from(&self, baseline: &Snapshot) -> SnapshotVariation {
        SnapshotVariation {
            count: variation(self.count as f64, baseline.count as f64),
            distinct_units: variation(self.distinct_units as f64, baseline.distinct_units as f64),
            total_amount: variation(self.total_amount, baseline.total_amount),
            mean_return: variation(self.mean_return, baseline.mean_return),
        }
    }
}

pub fn snapshot(view: &FilteredView<'_>) -> Snapshot {
    let distinct_units = view
        .iter()
        .map(|r| r.unit.as_str())
        .collect::<HashSet<_>>()
        .len();

    Snapshot {
        count: view.len(),
        distinct_units,
        total_amount: view.iter().map(|r| r.amount).sum(),
        mean_return: mean(view.iter().filter_map(|r| r.return_days)).unwrap_or(0.0),
    }
}

/// Arithmetic mean, `None` when there are no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Percentage change from `baseline` to `current`.
///
/// A missing or NaN side yields 0.0. A zero baseline yields 100.0 when
/// `current` is positive and 0.0 otherwise.
pub fn variation(current: impl Into<Option<f64>>, baseline: impl Into<Option<f64>>) -> f64 {
    let (Some(current), Some(baseline)) = (current.into(), baseline.into()) else {
        return 0.0;
    };
    if current.is_nan() || baseline.is_nan() {
        return 0.0;
    }
    if baseline == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    let pct = (current - baseline) / baseline * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Direction of a variation badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Flat,
}

impl Trend {
    pub fn of(pct: f64) -> Self {
        if pct > 0.0 {
            Trend::Increase
        } else if pct < 0.0 {
            Trend::Decrease
        } else {
            Trend::Flat
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Trend::Increase => "↑",
            Trend::Decrease => "↓",
            Trend::Flat => "→",
        }
    }
}

pub fn format_variation(pct: f64) -> String {
    let trend = Trend::of(pct);
    match trend {
        Trend::Increase => format!("{} +{:.1}%", trend.marker(), pct),
        Trend::Decrease => format!("{} {:.1}%", trend.marker(), pct),
        // -0.0 and NaN land here too; always render as plain zero
        Trend::Flat => format!("{} {:.1}%", trend.marker(), 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, DateRange, UnitSelection};
    use crate::models::Appointment;
    use chrono::NaiveDate;

    fn appt(day: u32, unit: &str, amount: f64, return_days: Option<f64>) -> Appointment {
        Appointment {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            unit: unit.to_string(),
            specialty: "Pediatria".to_string(),
            amount,
            return_days,
        }
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_snapshot_counts_and_sums() {
        let records = vec![
            appt(1, "UnitA", 100.0, Some(10.0)),
            appt(2, "UnitB", 200.0, None),
            appt(3, "UnitA", -30.0, Some(20.0)),
        ];
        let view = filter(&records, january(), &UnitSelection::all());
        let snap = snapshot(&view);
        assert_eq!(snap.count, 3);
        assert_eq!(snap.distinct_units, 2);
        assert!((snap.total_amount - 270.0).abs() < 1e-9);
        assert!((snap.mean_return - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_empty_view_is_zero() {
        let view = FilteredView::default();
        assert_eq!(snapshot(&view), Snapshot::default());
    }

    #[test]
    fn test_mean_return_all_null_is_zero() {
        let records = vec![appt(1, "UnitA", 10.0, None), appt(2, "UnitA", 10.0, None)];
        let view = filter(&records, january(), &UnitSelection::all());
        assert_eq!(snapshot(&view).mean_return, 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_variation_zero_baseline() {
        assert_eq!(variation(50.0, 0.0), 100.0);
        assert_eq!(variation(0.001, 0.0), 100.0);
        assert_eq!(variation(0.0, 0.0), 0.0);
        assert_eq!(variation(-5.0, 0.0), 0.0);
    }

    #[test]
    fn test_variation_standard_ratio() {
        let cases = [(150.0, 100.0), (50.0, 100.0), (-20.0, -10.0), (10.0, -40.0), (0.0, 7.0)];
        for (a, b) in cases {
            let expected = (a - b) / b * 100.0;
            assert!((variation(a, b) - expected).abs() < 1e-9, "variation({a}, {b})");
        }
    }

    #[test]
    fn test_variation_undefined_inputs() {
        assert_eq!(variation(None::<f64>, 10.0), 0.0);
        assert_eq!(variation(10.0, None::<f64>), 0.0);
        assert_eq!(variation(f64::NAN, 10.0), 0.0);
        assert_eq!(variation(10.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_format_variation_markers() {
        assert_eq!(format_variation(100.0), "↑ +100.0%");
        assert_eq!(format_variation(12.345), "↑ +12.3%");
        assert_eq!(format_variation(-7.26), "↓ -7.3%");
        assert_eq!(format_variation(0.0), "→ 0.0%");
        assert_eq!(format_variation(-0.0), "→ 0.0%");
        assert!(format_variation(0.0001).starts_with('↑'));
        assert!(format_variation(-0.0001).starts_with('↓'));
    }

    #[test]
    fn test_zero_baseline_scenario_formats_as_increase() {
        let pct = variation(50.0, 0.0);
        assert_eq!(pct, 100.0);
        assert!(format_variation(pct).ends_with("+100.0%"));
        assert_eq!(Trend::of(pct), Trend::Increase);
    }

    #[test]
    fn test_snapshot_variation() {
        let current = Snapshot {
            count: 4,
            distinct_units: 2,
            total_amount: 300.0,
            mean_return: 0.0,
        };
        let baseline = Snapshot {
            count: 2,
            distinct_units: 2,
            total_amount: 0.0,
            mean_return: 10.0,
        };
        let v = current.variation_from(&baseline);
        assert_eq!(v.count, 100.0);
        assert_eq!(v.distinct_units, 0.0);
        assert_eq!(v.total_amount, 100.0);
        assert_eq!(v.mean_return, -100.0);
    }
}
