//! Grouped aggregates behind the dashboard charts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::filter::FilteredView;
use crate::models::Appointment;

/// Column an aggregate is partitioned by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Unit,
    Specialty,
}

impl GroupKey {
    fn of(self, record: &Appointment) -> &str {
        match self {
            GroupKey::Unit => &record.unit,
            GroupKey::Specialty => &record.specialty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One group of a two-period comparison; absent sides are zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedGroup<V> {
    pub group: String,
    pub period_a: V,
    pub period_b: V,
}

fn group_by<V, F>(view: &FilteredView<'_>, key: GroupKey, value: F) -> Vec<(String, V)>
where
    V: Default + AddAssign,
    F: Fn(&Appointment) -> V,
{
    let mut groups: BTreeMap<&str, V> = BTreeMap::new();
    for record in view.iter() {
        *groups.entry(key.of(record)).or_default() += value(record);
    }
    groups
        .into_iter()
        .map(|(group, v)| (group.to_string(), v))
        .collect()
}

/// Total amount per group, ordered by group label.
pub fn group_sum(view: &FilteredView<'_>, key: GroupKey) -> Vec<(String, f64)> {
    group_by(view, key, |r| r.amount)
}

/// Record count per group, ordered by group label.
pub fn group_count(view: &FilteredView<'_>, key: GroupKey) -> Vec<(String, usize)> {
    group_by(view, key, |_| 1usize)
}

pub fn daily_count(view: &FilteredView<'_>) -> Vec<(NaiveDate, usize)> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in view.iter() {
        *days.entry(record.date).or_default() += 1;
    }
    days.into_iter().collect()
}

pub fn daily_sum(view: &FilteredView<'_>) -> Vec<(NaiveDate, f64)> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in view.iter() {
        *days.entry(record.date).or_default() += record.amount;
    }
    days.into_iter().collect()
}

/// Stable sort by value; ties keep label order.
pub fn sort_by_value<V: PartialOrd>(mut groups: Vec<(String, V)>, order: SortOrder) -> Vec<(String, V)> {
    groups.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
    groups
}

/// Full outer join of two grouped sequences on the group label.
pub fn outer_join<V: Copy + Default>(a: &[(String, V)], b: &[(String, V)]) -> Vec<JoinedGroup<V>> {
    let mut merged: BTreeMap<&str, (V, V)> = BTreeMap::new();
    for (group, v) in a {
        merged.entry(group.as_str()).or_default().0 = *v;
    }
    for (group, v) in b {
        merged.entry(group.as_str()).or_default().1 = *v;
    }
    merged
        .into_iter()
        .map(|(group, (period_a, period_b))| JoinedGroup {
            group: group.to_string(),
            period_a,
            period_b,
        })
        .collect()
}
