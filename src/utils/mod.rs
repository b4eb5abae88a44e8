//! Utility functions for formatting
//!
//! Centralized display helpers so currency, rates and durations look the
//! same in tables, the interactive mode and plain messages.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// Include "US$ " prefix
    USD,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// Rounds to cents and formats using Brazilian locale conventions:
/// - Thousands separator: `.` (period)
/// - Decimal separator: `,` (comma)
///
/// Non-finite values render as `-`.
///
/// # Examples
/// ```
/// use rendimentos::utils::{format_currency_with_width, CurrencySymbol};
///
/// assert_eq!(
///     format_currency_with_width(1234.56, 0, CurrencySymbol::BRL),
///     "R$ 1.234,56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(1234.0, 15, CurrencySymbol::None),
///     "       1.234,00"
/// );
/// ```
pub fn format_currency_with_width(value: f64, width: usize, symbol: CurrencySymbol) -> String {
    let Some(value) = Decimal::from_f64(value) else {
        return format!("{:>width$}", "-", width = width);
    };
    let value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = value < Decimal::ZERO;

    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (.) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::USD => "US$ ",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{},{}", prefix, sign, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as Brazilian Real with symbol: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use rendimentos::utils::format_currency;
///
/// assert_eq!(format_currency(1234.56), "R$ 1.234,56");
/// assert_eq!(format_currency(-500.0), "R$ -500,00");
/// ```
pub fn format_currency(value: f64) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::BRL)
}

pub fn format_usd(value: f64) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::USD)
}

/// Monthly rate as shown next to product names: "1,17% a.m."
pub fn format_rate(monthly_rate_percent: f64) -> String {
    format!("{}% a.m.", format!("{:.2}", monthly_rate_percent).replace('.', ","))
}

/// Plain percentage with a decimal comma: "14,98%"
pub fn format_percent(percent: f64) -> String {
    format!("{:.2}%", percent).replace('.', ",")
}

/// Human-readable month count: "8 months", "1 year", "2 years and 3 months"
pub fn format_duration_months(months: u32) -> String {
    let years = months / 12;
    let rest = months % 12;
    let plural = |n: u32, one: &str, many: &str| {
        if n == 1 {
            format!("1 {}", one)
        } else {
            format!("{} {}", n, many)
        }
    };

    match (years, rest) {
        (0, m) => plural(m, "month", "months"),
        (y, 0) => plural(y, "year", "years"),
        (y, m) => format!("{} and {}", plural(y, "year", "years"), plural(m, "month", "months")),
    }
}
