//! Plain-text rendering of the dashboard views for the terminal

use std::fmt::Write;

use crate::dashboard::{AnalysisView, ComparisonView, DataSummary};
use crate::format::{format_brl, format_date_br};
use crate::models::Appointment;

fn section_header(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "═".repeat(80));
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}\n", "═".repeat(80));
}

fn subsection(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
    let _ = writeln!(out, "{}", "─".repeat(70));
}

pub fn render_analysis(view: &AnalysisView) -> String {
    let mut out = String::new();
    section_header(&mut out, &format!("ANALYSIS  {}", view.period_label));

    let _ = writeln!(
        out,
        "  Compared with {} .. {}",
        format_date_br(view.prior_period.start),
        format_date_br(view.prior_period.end)
    );
    let _ = writeln!(out);
    for card in &view.cards {
        let _ = writeln!(out, "  {:22} {:>18}   {}", card.label, card.display, card.badge);
    }

    subsection(&mut out, "Appointments by Unit");
    if view.count_by_unit.is_empty() {
        let _ = writeln!(out, "  No appointments in this window.");
    }
    for g in &view.count_by_unit {
        let _ = writeln!(out, "  {:40} {:>8}", g.group, g.value);
    }

    subsection(&mut out, "Appointments by Specialty");
    for g in &view.count_by_specialty {
        let _ = writeln!(out, "  {:40} {:>8}", g.group, g.value);
    }

    subsection(&mut out, "Daily Volume");
    let _ = writeln!(out, "  {:12} {:>8} {:>20}", "Date", "Total", "Revenue");
    for (count, revenue) in view.daily_count.iter().zip(&view.daily_revenue) {
        let _ = writeln!(
            out,
            "  {:12} {:>8} {:>20}",
            format_date_br(count.date),
            count.value,
            format_brl(revenue.value)
        );
    }

    subsection(&mut out, "Revenue by Unit");
    for g in &view.revenue_by_unit {
        let _ = writeln!(out, "  {:40} {:>20}", g.group, format_brl(g.value));
    }

    subsection(&mut out, "Revenue by Specialty");
    for g in &view.revenue_by_specialty {
        let _ = writeln!(out, "  {:40} {:>20}", g.group, format_brl(g.value));
    }

    out
}

pub fn render_comparison(view: &ComparisonView) -> String {
    let mut out = String::new();
    section_header(&mut out, "PERIOD COMPARISON");

    let _ = writeln!(out, "  Period A: {}", view.label_a);
    let _ = writeln!(out, "  Period B: {}", view.label_b);
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:22} {:>18} {:>18}   {}", "Metric", "Period A", "Period B", "Change");
    let _ = writeln!(out, "  {}", "─".repeat(72));
    for card in &view.cards {
        let _ = writeln!(
            out,
            "  {:22} {:>18} {:>18}   {}",
            card.label, card.period_a, card.period_b, card.badge
        );
    }

    subsection(&mut out, "Appointments by Unit");
    let _ = writeln!(out, "  {:40} {:>8} {:>8}", "Unit", "A", "B");
    for g in &view.count_by_unit {
        let _ = writeln!(out, "  {:40} {:>8} {:>8}", g.group, g.period_a, g.period_b);
    }

    subsection(&mut out, "Revenue by Specialty");
    let _ = writeln!(out, "  {:30} {:>18} {:>18}", "Specialty", "A", "B");
    for g in &view.revenue_by_specialty {
        let _ = writeln!(
            out,
            "  {:30} {:>18} {:>18}",
            g.group,
            format_brl(g.period_a),
            format_brl(g.period_b)
        );
    }

    out
}

pub fn render_table(records: &[Appointment], summary: &DataSummary) -> String {
    let mut out = String::new();
    section_header(&mut out, "ALL RECORDS");

    let _ = writeln!(
        out,
        "  {:12} {:24} {:24} {:>16} {:>8}",
        "Date", "Unit", "Specialty", "Amount", "Return"
    );
    let _ = writeln!(out, "  {}", "─".repeat(88));
    for r in records {
        let ret = r
            .return_days
            .map(|d| format!("{:.0}", d))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:12} {:24} {:24} {:>16} {:>8}",
            format_date_br(r.date),
            r.unit,
            r.specialty,
            format_brl(r.amount),
            ret
        );
    }

    subsection(&mut out, "Overall Statistics");
    let span = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!("{} a {}", first, last),
        _ => "-".to_string(),
    };
    let _ = writeln!(out, "  Total records:        {:>20}", summary.total_records);
    let _ = writeln!(out, "  Period:               {:>20}", span);
    let _ = writeln!(out, "  Total revenue:        {:>20}", summary.total_revenue_display);
    let _ = writeln!(out, "  Average amount:       {:>20}", summary.mean_amount_display);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{build_analysis, build_comparison, summarize, AnalysisQuery, ComparisonQuery};
    use chrono::NaiveDate;

    fn records() -> Vec<Appointment> {
        vec![
            Appointment {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                unit: "Centro".to_string(),
                specialty: "Cardiologia".to_string(),
                amount: 1500.0,
                return_days: Some(30.0),
            },
            Appointment {
                date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
                unit: "Norte".to_string(),
                specialty: "Pediatria".to_string(),
                amount: 250.0,
                return_days: None,
            },
        ]
    }

    #[test]
    fn test_render_analysis_contains_cards() {
        let records = records();
        let text = render_analysis(&build_analysis(&records, &AnalysisQuery::default()));
        assert!(text.contains("01/05/2024 até 06/05/2024"));
        assert!(text.contains("R$ 1.750,00"));
        assert!(text.contains("↑ +100.0%"));
        assert!(text.contains("Revenue by Specialty"));
    }

    #[test]
    fn test_render_comparison_lists_both_periods() {
        let records = records();
        let text = render_comparison(&build_comparison(&records, &ComparisonQuery::default()));
        assert!(text.contains("Period A: 01/05/2024 até 03/05/2024"));
        assert!(text.contains("Period B: 04/05/2024 até 06/05/2024"));
        assert!(text.contains("Norte"));
    }

    #[test]
    fn test_render_table_marks_missing_return() {
        let records = records();
        let text = render_table(&records, &summarize(&records));
        assert!(text.contains("2024-05-01 a 2024-05-06"));
        assert!(text.lines().any(|l| l.contains("Norte") && l.trim_end().ends_with('-')));
    }
}
