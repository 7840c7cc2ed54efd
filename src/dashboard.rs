//! Dashboard views assembled from the filter, metrics and aggregate modules
//!
//! These are pure functions over the loaded table. The API service and the
//! terminal report both render from the structs built here.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate::{
    daily_count, daily_sum, group_count, group_sum, outer_join, sort_by_value, GroupKey,
    JoinedGroup, SortOrder,
};
use crate::filter::{date_bounds, filter, prior_period, unit_options, DateRange, UnitSelection};
use crate::format::{format_brl, period_label};
use crate::metrics::{format_variation, mean, snapshot, Snapshot, SnapshotVariation, Trend};
use crate::models::Appointment;

// ============================================================================
// Queries
// ============================================================================

/// Single-period analysis filters; missing dates default to the data bounds.
#[derive(Debug, Clone, Default)]
pub struct AnalysisQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub units: UnitSelection,
}

/// Two independent windows sharing one unit filter
#[derive(Debug, Clone, Default)]
pub struct ComparisonQuery {
    pub a_start: Option<NaiveDate>,
    pub a_end: Option<NaiveDate>,
    pub b_start: Option<NaiveDate>,
    pub b_end: Option<NaiveDate>,
    pub units: UnitSelection,
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue<V> {
    pub group: String,
    pub value: V,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyValue<V> {
    pub date: NaiveDate,
    pub value: V,
}

/// One headline metric with its badge against the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
    pub variation: f64,
    pub trend: Trend,
    pub badge: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub period: DateRange,
    pub period_label: String,
    pub prior_period: DateRange,
    pub current: Snapshot,
    pub baseline: Snapshot,
    pub variation: SnapshotVariation,
    pub cards: Vec<MetricCard>,
    pub count_by_unit: Vec<GroupValue<usize>>,
    pub count_by_specialty: Vec<GroupValue<usize>>,
    pub daily_count: Vec<DailyValue<usize>>,
    pub daily_revenue: Vec<DailyValue<f64>>,
    pub revenue_by_unit: Vec<GroupValue<f64>>,
    pub revenue_by_specialty: Vec<GroupValue<f64>>,
}

/// A metric shown side by side for periods A and B
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCard {
    pub label: &'static str,
    pub period_a: String,
    pub period_b: String,
    pub variation: f64,
    pub trend: Trend,
    pub badge: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    pub period_a: DateRange,
    pub period_b: DateRange,
    pub label_a: String,
    pub label_b: String,
    pub snapshot_a: Snapshot,
    pub snapshot_b: Snapshot,
    /// Change of B relative to A
    pub variation: SnapshotVariation,
    pub cards: Vec<ComparisonCard>,
    pub count_by_unit: Vec<JoinedGroup<usize>>,
    pub revenue_by_specialty: Vec<JoinedGroup<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub units: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_revenue: f64,
    pub total_revenue_display: String,
    pub mean_amount: f64,
    pub mean_amount_display: String,
}

// ============================================================================
// Builders
// ============================================================================

const LABEL_COUNT: &str = "Total appointments";
const LABEL_UNITS: &str = "Active units";
const LABEL_REVENUE: &str = "Total revenue";
const LABEL_RETURN: &str = "Average return";

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn group_values<V>(groups: Vec<(String, V)>) -> Vec<GroupValue<V>> {
    groups
        .into_iter()
        .map(|(group, value)| GroupValue { group, value })
        .collect()
}

fn daily_values<V>(days: Vec<(NaiveDate, V)>) -> Vec<DailyValue<V>> {
    days.into_iter()
        .map(|(date, value)| DailyValue { date, value })
        .collect()
}

fn return_display(days: f64) -> String {
    format!("{:.1}d", days)
}

/// Display strings for the four snapshot metrics, in card order.
fn snapshot_displays(s: &Snapshot) -> [(&'static str, f64, String); 4] {
    [
        (LABEL_COUNT, s.count as f64, s.count.to_string()),
        (LABEL_UNITS, s.distinct_units as f64, s.distinct_units.to_string()),
        (LABEL_REVENUE, s.total_amount, format_brl(s.total_amount)),
        (LABEL_RETURN, s.mean_return, return_display(s.mean_return)),
    ]
}

fn variations(v: &SnapshotVariation) -> [f64; 4] {
    [v.count, v.distinct_units, v.total_amount, v.mean_return]
}

pub fn metric_cards(current: &Snapshot, variation: &SnapshotVariation) -> Vec<MetricCard> {
    snapshot_displays(current)
        .into_iter()
        .zip(variations(variation))
        .map(|((label, value, display), pct)| MetricCard {
            label,
            value,
            display,
            variation: pct,
            trend: Trend::of(pct),
            badge: format_variation(pct),
        })
        .collect()
}

/// Pull a window into the dataset bounds when there are any.
fn within(range: DateRange, bounds: Option<DateRange>) -> DateRange {
    match bounds {
        Some(bounds) => range.clamp_to(bounds),
        None => range,
    }
}

/// Selected window, defaulting open ends to the dataset bounds and clamping
/// explicit dates into them.
pub fn resolve_range(
    records: &[Appointment],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> DateRange {
    let bounds = date_bounds(records);
    let start = start
        .or(bounds.map(|b| b.start))
        .unwrap_or_else(today);
    let end = end.or(bounds.map(|b| b.end)).unwrap_or(start);
    within(DateRange::new(start, end), bounds)
}

pub fn build_analysis(records: &[Appointment], query: &AnalysisQuery) -> AnalysisView {
    let period = resolve_range(records, query.start, query.end);
    let prior = prior_period(period);

    let view = filter(records, period, &query.units);
    let baseline_view = filter(records, prior, &query.units);

    let current = snapshot(&view);
    let baseline = snapshot(&baseline_view);
    let variation = current.variation_from(&baseline);

    AnalysisView {
        period,
        period_label: period_label(period),
        prior_period: prior,
        current,
        baseline,
        variation,
        cards: metric_cards(&current, &variation),
        count_by_unit: group_values(sort_by_value(
            group_count(&view, GroupKey::Unit),
            SortOrder::Descending,
        )),
        count_by_specialty: group_values(group_count(&view, GroupKey::Specialty)),
        daily_count: daily_values(daily_count(&view)),
        daily_revenue: daily_values(daily_sum(&view)),
        revenue_by_unit: group_values(sort_by_value(
            group_sum(&view, GroupKey::Unit),
            SortOrder::Ascending,
        )),
        revenue_by_specialty: group_values(sort_by_value(
            group_sum(&view, GroupKey::Specialty),
            SortOrder::Descending,
        )),
    }
}

/// Default windows: A covers the first three days, B the rest.
fn default_comparison_ranges(records: &[Appointment]) -> (DateRange, DateRange) {
    let bounds = date_bounds(records).unwrap_or_else(|| DateRange::new(today(), today()));
    let offset = |days| bounds.start.checked_add_signed(Duration::days(days));
    let a = DateRange::new(bounds.start, offset(2).unwrap_or(bounds.end));
    let b = match offset(3) {
        Some(start) => DateRange::new(start, bounds.end),
        None => DateRange::empty(),
    };
    (a, b)
}

pub fn build_comparison(records: &[Appointment], query: &ComparisonQuery) -> ComparisonView {
    let bounds = date_bounds(records);
    let (default_a, default_b) = default_comparison_ranges(records);
    let period_a = within(
        DateRange::new(
            query.a_start.unwrap_or(default_a.start),
            query.a_end.unwrap_or(default_a.end),
        ),
        bounds,
    );
    let period_b = within(
        DateRange::new(
            query.b_start.unwrap_or(default_b.start),
            query.b_end.unwrap_or(default_b.end),
        ),
        bounds,
    );

    let view_a = filter(records, period_a, &query.units);
    let view_b = filter(records, period_b, &query.units);
    let snapshot_a = snapshot(&view_a);
    let snapshot_b = snapshot(&view_b);
    let variation = snapshot_b.variation_from(&snapshot_a);

    let cards = snapshot_displays(&snapshot_a)
        .into_iter()
        .zip(snapshot_displays(&snapshot_b))
        .zip(variations(&variation))
        .map(|(((label, _, a), (_, _, b)), pct)| ComparisonCard {
            label,
            period_a: a,
            period_b: b,
            variation: pct,
            trend: Trend::of(pct),
            badge: format_variation(pct),
        })
        .collect();

    ComparisonView {
        period_a,
        period_b,
        label_a: period_label(period_a),
        label_b: period_label(period_b),
        snapshot_a,
        snapshot_b,
        variation,
        cards,
        count_by_unit: outer_join(
            &group_count(&view_a, GroupKey::Unit),
            &group_count(&view_b, GroupKey::Unit),
        ),
        revenue_by_specialty: outer_join(
            &group_sum(&view_a, GroupKey::Specialty),
            &group_sum(&view_b, GroupKey::Specialty),
        ),
    }
}

pub fn filter_options(records: &[Appointment]) -> FilterOptions {
    let bounds = date_bounds(records);
    FilterOptions {
        units: unit_options(records),
        first_date: bounds.map(|b| b.start),
        last_date: bounds.map(|b| b.end),
    }
}

pub fn summarize(records: &[Appointment]) -> DataSummary {
    let bounds = date_bounds(records);
    let total_revenue: f64 = records.iter().map(|r| r.amount).sum();
    let mean_amount = mean(records.iter().map(|r| r.amount)).unwrap_or(0.0);

    DataSummary {
        total_records: records.len(),
        first_date: bounds.map(|b| b.start),
        last_date: bounds.map(|b| b.end),
        total_revenue,
        total_revenue_display: format_brl(total_revenue),
        mean_amount,
        mean_amount_display: format_brl(mean_amount),
    }
}

/// All records, newest first; ties keep source order.
pub fn records_newest_first(records: &[Appointment], limit: Option<usize>) -> Vec<Appointment> {
    let mut rows = records.to_vec();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
