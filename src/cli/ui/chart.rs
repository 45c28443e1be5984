//! Text rendering of a [`Breakdown`] as a proportional bar chart.
//!
//! Each slice gets its label, summed amount, share of the total and a bar
//! whose length is proportional to that share. Percentages are computed here;
//! the ledger only provides raw sums.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::cli::output::current_preferences;
use crate::cli::ui::table_renderer::{Table, TableColumn};
use crate::config::{MAX_CHART_WIDTH, MIN_CHART_WIDTH};
use crate::currency::{format_currency_value, CurrencyFormat};
use crate::ledger::Breakdown;

const DEFAULT_BAR_WIDTH: usize = 30;
const MIN_BAR_WIDTH: usize = MIN_CHART_WIDTH as usize;
const MAX_BAR_WIDTH: usize = MAX_CHART_WIDTH as usize;
/// Columns taken by label, amount and share before the bar starts.
const RESERVED_COLUMNS: usize = 48;

/// Share of each slice as a percentage rounded to one decimal place.
///
/// All shares are zero when the total is zero.
pub fn percentages(breakdown: &Breakdown) -> Vec<Decimal> {
    let total = breakdown.total();
    breakdown
        .slices
        .iter()
        .map(|slice| {
            slice
                .amount
                .checked_div(total)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(|share| share.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
                .unwrap_or(Decimal::ZERO)
        })
        .collect()
}

/// Bar width from the configured override or the terminal size.
pub fn bar_width(configured: Option<u16>) -> usize {
    if let Some(width) = configured {
        return usize::from(width).clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);
    }
    match crossterm::terminal::size() {
        Ok((columns, _)) => usize::from(columns)
            .saturating_sub(RESERVED_COLUMNS)
            .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH),
        Err(_) => DEFAULT_BAR_WIDTH,
    }
}

fn bar(share: Decimal, width: usize, glyph: char) -> String {
    let cells = (share * Decimal::from(width) / Decimal::ONE_HUNDRED)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    // Non-zero slices always get at least one cell.
    let cells = if cells == 0 && share > Decimal::ZERO { 1 } else { cells };
    std::iter::repeat(glyph).take(cells).collect()
}

/// Renders `breakdown` with one line per slice.
pub fn render_breakdown(breakdown: &Breakdown, format: &CurrencyFormat, width: usize) -> String {
    let glyph = if current_preferences().plain_mode {
        '#'
    } else {
        '█'
    };
    let mut table = Table::new(vec![
        TableColumn::left("Label").max(24),
        TableColumn::right("Amount"),
        TableColumn::right("Share"),
        TableColumn::left(""),
    ])
    .without_headers();

    for (slice, share) in breakdown.slices.iter().zip(percentages(breakdown)) {
        table.push_row(vec![
            slice.label.clone(),
            format_currency_value(slice.amount, format),
            format!("{share:.1}%"),
            bar(share, width, glyph),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Dimension, Slice};

    fn breakdown(values: &[(&str, i64)]) -> Breakdown {
        Breakdown {
            dimension: Dimension::Type,
            slices: values
                .iter()
                .map(|(label, cents)| Slice {
                    label: label.to_string(),
                    amount: Decimal::new(*cents, 2),
                })
                .collect(),
        }
    }

    #[test]
    fn percentages_follow_amounts() {
        let shares = percentages(&breakdown(&[("Income", 100_000), ("Expense", 2950)]));
        assert_eq!(shares, vec![Decimal::new(971, 1), Decimal::new(29, 1)]);
    }

    #[test]
    fn zero_total_yields_zero_shares() {
        let shares = percentages(&breakdown(&[("Food", 0), ("Cash", 0)]));
        assert!(shares.iter().all(Decimal::is_zero));
    }

    #[test]
    fn huge_amounts_keep_shares_in_range() {
        let breakdown = Breakdown {
            dimension: Dimension::Type,
            slices: vec![
                Slice {
                    label: "Income".into(),
                    amount: Decimal::from_i128_with_scale(10_i128.pow(27), 0),
                },
                Slice {
                    label: "Expense".into(),
                    amount: Decimal::ONE_HUNDRED,
                },
            ],
        };
        let shares = percentages(&breakdown);
        assert_eq!(shares, vec![Decimal::ONE_HUNDRED, Decimal::ZERO]);
        let rendered = render_breakdown(&breakdown, &CurrencyFormat::default(), 20);
        assert!(rendered.contains("100.0%"));
    }

    #[test]
    fn small_slices_still_draw_a_cell() {
        assert_eq!(bar(Decimal::new(1, 1), 20, '#'), "#");
        assert_eq!(bar(Decimal::ZERO, 20, '#'), "");
        assert_eq!(bar(Decimal::ONE_HUNDRED, 20, '#').len(), 20);
    }

    #[test]
    fn configured_width_is_clamped() {
        assert_eq!(bar_width(Some(5)), MIN_BAR_WIDTH);
        assert_eq!(bar_width(Some(40)), 40);
        assert_eq!(bar_width(Some(500)), MAX_BAR_WIDTH);
    }

    #[test]
    fn rendered_lines_include_label_amount_and_share() {
        let rendered = render_breakdown(
            &breakdown(&[("Income", 100_000), ("Expense", 2950)]),
            &CurrencyFormat::default(),
            20,
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Income"));
        assert!(lines[0].contains("R$ 1,000.00"));
        assert!(lines[0].contains("97.1%"));
        assert!(lines[1].contains("2.9%"));
    }
}
