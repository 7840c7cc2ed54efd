//! Display helpers for Brazilian currency and dates

use chrono::NaiveDate;

use crate::filter::DateRange;

/// `R$ 1.234,56`: dot thousands separator, comma decimals, sign after the symbol.
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return format!("R$ {}", value);
    }
    let scaled = (value.abs() * 100.0).round();
    if scaled >= u128::MAX as f64 {
        return format!("R$ {:.2e}", value);
    }
    let cents = scaled as u128;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {}{},{:02}", sign, grouped, frac)
}

pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Period label shown above the metric cards.
pub fn period_label(range: DateRange) -> String {
    format!("{} até {}", format_date_br(range.start), format_date_br(range.end))
}
