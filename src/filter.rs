//! Date-range and unit filtering over the appointment table

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::models::Appointment;

/// Inclusive calendar window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A window no date falls into.
    pub fn empty() -> Self {
        Self::new(NaiveDate::MAX, NaiveDate::MIN)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Inclusive day count; zero or negative when `start > end`.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Pull both ends into `bounds`. Inverted windows are left as they are so
    /// they stay empty.
    pub fn clamp_to(self, bounds: DateRange) -> Self {
        if self.is_empty() || bounds.is_empty() {
            return self;
        }
        Self::new(
            self.start.clamp(bounds.start, bounds.end),
            self.end.clamp(bounds.start, bounds.end),
        )
    }
}

/// Selected clinic units. An empty selection applies no unit filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSelection(HashSet<String>);

impl UnitSelection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list, ignoring blank entries.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, unit: &str) -> bool {
        self.0.is_empty() || self.0.contains(unit)
    }
}

impl FromIterator<String> for UnitSelection {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for UnitSelection {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// Records passing the active date and unit predicates, borrowed from the source table
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a Appointment>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Appointment> + '_ {
        self.records.iter().copied()
    }
}

impl<'a> FromIterator<&'a Appointment> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Appointment>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

pub fn filter<'a>(
    records: &'a [Appointment],
    range: DateRange,
    units: &UnitSelection,
) -> FilteredView<'a> {
    records
        .iter()
        .filter(|r| range.contains(r.date) && units.matches(&r.unit))
        .collect()
}

/// Same-length window ending the day before `range.start`. Falls back to an
/// empty window when that would leave the calendar.
pub fn prior_period(range: DateRange) -> DateRange {
    let end = range.start.checked_sub_signed(Duration::days(1));
    let start = range.start.checked_sub_signed(Duration::days(range.days()));
    match (start, end) {
        (Some(start), Some(end)) => DateRange { start, end },
        _ => DateRange::empty(),
    }
}

/// Earliest and latest appointment dates, `None` for an empty table.
pub fn date_bounds(records: &[Appointment]) -> Option<DateRange> {
    let min = records.iter().map(|r| r.date).min()?;
    let max = records.iter().map(|r| r.date).max()?;
    Some(DateRange::new(min, max))
}

/// Distinct unit labels, sorted.
pub fn unit_options(records: &[Appointment]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.unit.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
