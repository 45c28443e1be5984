//! Currency and date formatting for display, plus amount parsing for input.

use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

const DISPLAY_PRECISION: u32 = 2;
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Symbol and separators used when rendering money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "R$".into(),
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

/// Renders `value` as `<symbol> <grouped digits>.<2 decimals>`, e.g. `R$ 1,000.00`.
///
/// Negative values keep the symbol first: `R$ -5.00`.
pub fn format_currency_value(value: Decimal, format: &CurrencyFormat) -> String {
    let number = format_grouped(value, format);
    if format.symbol.is_empty() {
        number
    } else {
        format!("{} {}", format.symbol, number)
    }
}

/// Grouped fixed-point number without the currency symbol.
pub fn format_grouped(value: Decimal, format: &CurrencyFormat) -> String {
    let rounded = value.round_dp_with_strategy(DISPLAY_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded < Decimal::ZERO;
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(format.grouping_separator);
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!(
        "{sign}{grouped}{}{frac_part}",
        format.decimal_separator
    )
}

/// Parses user input such as `1,000.50` or `R$ 25.5` into a decimal.
///
/// Sign is preserved so the ledger can reject negative amounts itself.
pub fn parse_amount(input: &str, format: &CurrencyFormat) -> Result<Decimal, LedgerError> {
    let mut raw = input.trim();
    if !format.symbol.is_empty() {
        raw = raw.strip_prefix(format.symbol.as_str()).unwrap_or(raw).trim();
    }
    let normalized: String = raw
        .chars()
        .filter(|ch| *ch != format.grouping_separator && !ch.is_whitespace())
        .map(|ch| if ch == format.decimal_separator { '.' } else { ch })
        .collect();
    if normalized.is_empty() {
        return Err(LedgerError::InvalidInput("amount cannot be empty".into()));
    }
    normalized
        .parse::<Decimal>()
        .map_err(|_| LedgerError::InvalidInput(format!("`{}` is not a valid amount", input.trim())))
}

/// Formats `date` with a strftime `pattern`, falling back to ISO dates when
/// the pattern cannot be rendered.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_ok() {
        return out;
    }
    tracing::warn!(pattern, "invalid date format; using ISO dates");
    date.format(FALLBACK_DATE_FORMAT).to_string()
}
