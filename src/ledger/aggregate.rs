//! Grouped totals used to feed the breakdown charts and the balance metric.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{Entry, EntryKind};
use crate::errors::LedgerError;

/// Grouping key used when summing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Type,
    Category,
    PaymentMethod,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Type,
        Dimension::Category,
        Dimension::PaymentMethod,
    ];

    /// Title shown above the chart for this dimension.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Type => "Income vs Expenses",
            Dimension::Category => "Distribution by Category",
            Dimension::PaymentMethod => "Distribution by Payment Method",
        }
    }

    fn key<'a>(&self, entry: &'a Entry) -> &'a str {
        match self {
            Dimension::Type => entry.kind.label(),
            Dimension::Category => entry.category.label(),
            Dimension::PaymentMethod => entry.payment_method.label(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Type => "type",
            Dimension::Category => "category",
            Dimension::PaymentMethod => "payment",
        };
        f.write_str(name)
    }
}

impl FromStr for Dimension {
    type Err = LedgerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "type" | "kind" => Ok(Dimension::Type),
            "category" | "categories" => Ok(Dimension::Category),
            "payment" | "payments" | "payment-method" | "method" => Ok(Dimension::PaymentMethod),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown dimension `{other}` (expected type, category or payment)"
            ))),
        }
    }
}

/// One group of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub amount: Decimal,
}

/// Summed amounts per group label, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub slices: Vec<Slice>,
}

impl Breakdown {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.slices
            .iter()
            .fold(Decimal::ZERO, |sum, slice| sum.saturating_add(slice.amount))
    }

    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.slices
            .iter()
            .find(|slice| slice.label == label)
            .map(|slice| slice.amount)
    }
}

/// Income, expense and net balance over a set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    pub fn balance(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }
}

/// Groups `entries` by `dimension` and sums their amounts in a single pass.
pub fn aggregate(entries: &[Entry], dimension: Dimension) -> Breakdown {
    let mut slices: Vec<Slice> = Vec::new();
    for entry in entries {
        let key = dimension.key(entry);
        match slices.iter_mut().find(|slice| slice.label == key) {
            Some(slice) => slice.amount = slice.amount.saturating_add(entry.amount),
            None => slices.push(Slice {
                label: key.to_string(),
                amount: entry.amount,
            }),
        }
    }
    Breakdown { dimension, slices }
}

pub fn totals(entries: &[Entry]) -> Totals {
    entries
        .iter()
        .fold(Totals::default(), |mut totals, entry| {
            match entry.kind {
                EntryKind::Income => totals.income = totals.income.saturating_add(entry.amount),
                EntryKind::Expense => {
                    totals.expense = totals.expense.saturating_add(entry.amount)
                }
            }
            totals
        })
}

/// Income minus expense. Sums saturate at the `Decimal` bounds.
pub fn net_balance(entries: &[Entry]) -> Decimal {
    entries
        .iter()
        .fold(Decimal::ZERO, |sum, entry| sum.saturating_add(entry.signed_amount()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Category, PaymentMethod};

    fn entry(kind: EntryKind, category: Category, method: PaymentMethod, cents: i64) -> Entry {
        Entry::new(kind, "", category, method, Decimal::new(cents, 2))
    }

    #[test]
    fn aggregate_keeps_first_appearance_order() {
        let entries = vec![
            entry(EntryKind::Expense, Category::Transport, PaymentMethod::Cash, 400),
            entry(EntryKind::Expense, Category::Food, PaymentMethod::Debit, 1000),
            entry(EntryKind::Expense, Category::Transport, PaymentMethod::Cash, 250),
        ];
        let breakdown = aggregate(&entries, Dimension::Category);
        let labels: Vec<&str> = breakdown.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Transport", "Food"]);
        assert_eq!(breakdown.get("Transport"), Some(Decimal::new(650, 2)));
    }

    #[test]
    fn custom_labels_group_by_text() {
        let entries = vec![
            entry(
                EntryKind::Expense,
                Category::Custom("Pets".into()),
                PaymentMethod::Cash,
                100,
            ),
            entry(
                EntryKind::Expense,
                Category::Custom("Pets".into()),
                PaymentMethod::Cash,
                100,
            ),
        ];
        let breakdown = aggregate(&entries, Dimension::Category);
        assert_eq!(breakdown.slices.len(), 1);
        assert_eq!(breakdown.total(), Decimal::new(200, 2));
    }

    #[test]
    fn empty_entries_yield_empty_results() {
        assert!(aggregate(&[], Dimension::Type).is_empty());
        assert_eq!(net_balance(&[]), Decimal::ZERO);
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn totals_match_net_balance() {
        let entries = vec![
            entry(EntryKind::Income, Category::Other, PaymentMethod::Cash, 10000),
            entry(EntryKind::Expense, Category::Food, PaymentMethod::Cash, 12050),
        ];
        let totals = totals(&entries);
        assert_eq!(totals.balance(), net_balance(&entries));
        assert_eq!(totals.balance(), Decimal::new(-2050, 2));
    }

    #[test]
    fn dimension_parses_names() {
        assert_eq!("payment".parse::<Dimension>().unwrap(), Dimension::PaymentMethod);
        assert_eq!("Kind".parse::<Dimension>().unwrap(), Dimension::Type);
        assert!("month".parse::<Dimension>().is_err());
    }

    #[test]
    fn sums_saturate_instead_of_overflowing() {
        let big = |kind| Entry::new(kind, "", Category::Other, PaymentMethod::Cash, Decimal::MAX);
        let entries = vec![big(EntryKind::Income), big(EntryKind::Income), big(EntryKind::Expense)];
        assert_eq!(aggregate(&entries, Dimension::Type).get("Income"), Some(Decimal::MAX));
        assert_eq!(totals(&entries).income, Decimal::MAX);
        assert_eq!(totals(&entries).expense, Decimal::MAX);
        assert_eq!(net_balance(&entries), Decimal::ZERO);
    }
}
