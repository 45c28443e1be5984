use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    aggregate::{self, Breakdown, Dimension, Totals},
    entry::{Entry, EntryId},
};
use crate::errors::{LedgerError, LedgerResult};

/// Externally observable ledger states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    Empty,
    NonEmpty,
}

/// Ordered, in-memory sequence of entries for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<Entry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends `entry` at the end and stamps it with a fresh id.
    ///
    /// The sum of all amounts must stay representable, which keeps every
    /// breakdown, total and balance free of overflow.
    pub fn append(&mut self, mut entry: Entry) -> LedgerResult<EntryId> {
        if entry.amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(entry.amount));
        }
        if self
            .volume()
            .and_then(|volume| volume.checked_add(entry.amount))
            .is_none()
        {
            return Err(LedgerError::TotalOverflow(entry.amount));
        }
        let id = EntryId::new();
        entry.id = id;
        tracing::debug!(%id, kind = %entry.kind, amount = %entry.amount, "entry appended");
        self.entries.push(entry);
        self.touch();
        Ok(id)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> LedgerState {
        if self.entries.is_empty() {
            LedgerState::Empty
        } else {
            LedgerState::NonEmpty
        }
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Resolves a short id prefix. Ambiguous or unknown prefixes return `None`.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<EntryId> {
        let mut matches = self
            .entries
            .iter()
            .filter(|entry| entry.id.matches_prefix(prefix));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.id)
    }

    /// Removes the entries at `indices`, evaluated against the current state.
    ///
    /// Survivors keep their relative order. The whole batch is rejected when any
    /// index is out of range. Duplicate indices count once.
    pub fn delete_by_indices(&mut self, indices: &[usize]) -> LedgerResult<usize> {
        if indices.is_empty() {
            return Ok(0);
        }
        let len = self.entries.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(LedgerError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            });
        }
        let doomed: BTreeSet<usize> = indices.iter().copied().collect();
        let mut position = 0usize;
        self.entries.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });
        self.finish_delete(doomed.len())
    }

    /// Removes the entries carrying `ids`. Unknown ids reject the whole batch.
    pub fn delete_by_ids(&mut self, ids: &[EntryId]) -> LedgerResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        if let Some(&missing) = ids.iter().find(|&&id| self.position(id).is_none()) {
            return Err(LedgerError::UnknownEntry(missing));
        }
        let doomed: BTreeSet<EntryId> = ids.iter().copied().collect();
        self.entries.retain(|entry| !doomed.contains(&entry.id));
        self.finish_delete(doomed.len())
    }

    fn finish_delete(&mut self, removed: usize) -> LedgerResult<usize> {
        tracing::info!(removed, remaining = self.entries.len(), "entries deleted");
        self.touch();
        Ok(removed)
    }

    pub fn aggregate(&self, dimension: Dimension) -> Breakdown {
        aggregate::aggregate(&self.entries, dimension)
    }

    pub fn net_balance(&self) -> Decimal {
        aggregate::net_balance(&self.entries)
    }

    pub fn totals(&self) -> Totals {
        aggregate::totals(&self.entries)
    }

    /// Sum of every amount regardless of kind.
    fn volume(&self) -> Option<Decimal> {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |sum, entry| sum.checked_add(entry.amount))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Category, EntryKind, PaymentMethod};

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .append(Entry::new(
                EntryKind::Income,
                "Salary",
                Category::Food,
                PaymentMethod::InstantTransfer,
                dec(100_000),
            ))
            .unwrap();
        ledger
            .append(Entry::new(
                EntryKind::Expense,
                "Lunch",
                Category::Food,
                PaymentMethod::CreditCard,
                dec(2550),
            ))
            .unwrap();
        ledger
            .append(Entry::new(
                EntryKind::Expense,
                "Bus",
                Category::Transport,
                PaymentMethod::Cash,
                dec(400),
            ))
            .unwrap();
        ledger
    }

    fn descriptions(ledger: &Ledger) -> Vec<&str> {
        ledger
            .entries()
            .iter()
            .map(|entry| entry.description.as_str())
            .collect()
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert_eq!(ledger.state(), LedgerState::Empty);
        assert!(ledger.aggregate(Dimension::Category).is_empty());
        assert_eq!(ledger.net_balance(), Decimal::ZERO);
    }

    #[test]
    fn end_to_end_balance_and_breakdown() {
        let ledger = sample_ledger();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.state(), LedgerState::NonEmpty);
        assert_eq!(ledger.net_balance(), dec(97_050));

        let by_type = ledger.aggregate(Dimension::Type);
        assert_eq!(by_type.get("Income"), Some(dec(100_000)));
        assert_eq!(by_type.get("Expense"), Some(dec(2950)));
        assert_eq!(by_type.slices.len(), 2);
    }

    #[test]
    fn negative_amount_is_rejected_without_mutation() {
        let mut ledger = sample_ledger();
        let err = ledger
            .append(Entry::new(
                EntryKind::Expense,
                "Refund",
                Category::Other,
                PaymentMethod::Cash,
                dec(-100),
            ))
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(dec(-100)));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn zero_amount_is_accepted() {
        let mut ledger = Ledger::new();
        let zero = Entry::new(
            EntryKind::Expense,
            "Free sample",
            Category::Food,
            PaymentMethod::Cash,
            Decimal::ZERO,
        );
        assert!(ledger.append(zero).is_ok());
    }

    #[test]
    fn append_stamps_unique_ids_for_duplicate_values() {
        let mut ledger = Ledger::new();
        let entry = Entry::new(
            EntryKind::Expense,
            "Coffee",
            Category::Food,
            PaymentMethod::Cash,
            dec(500),
        );
        let first = ledger.append(entry.clone()).unwrap();
        let second = ledger.append(entry).unwrap();
        assert_ne!(first, second);
        assert_eq!(ledger.position(second), Some(1));
    }

    #[test]
    fn delete_by_index_reindexes_survivors() {
        let mut ledger = sample_ledger();
        let removed = ledger.delete_by_indices(&[1]).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(descriptions(&ledger), vec!["Salary", "Bus"]);
        assert_eq!(ledger.get(1).map(|e| e.description.as_str()), Some("Bus"));
        assert_eq!(ledger.net_balance(), dec(99_600));
    }

    #[test]
    fn delete_with_empty_selection_is_noop() {
        let mut ledger = sample_ledger();
        let before = ledger.entries().to_vec();
        assert_eq!(ledger.delete_by_indices(&[]).unwrap(), 0);
        assert_eq!(ledger.delete_by_ids(&[]).unwrap(), 0);
        assert_eq!(ledger.entries(), before.as_slice());
    }

    #[test]
    fn delete_out_of_range_leaves_ledger_unchanged() {
        let mut ledger = sample_ledger();
        let before = ledger.entries().to_vec();
        let err = ledger.delete_by_indices(&[0, 3]).unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { index: 3, len: 3 });
        assert_eq!(ledger.entries(), before.as_slice());
    }

    #[test]
    fn duplicate_indices_count_once() {
        let mut ledger = sample_ledger();
        assert_eq!(ledger.delete_by_indices(&[2, 2, 0]).unwrap(), 2);
        assert_eq!(descriptions(&ledger), vec!["Lunch"]);
    }

    #[test]
    fn deleting_everything_returns_to_empty() {
        let mut ledger = sample_ledger();
        ledger.delete_by_indices(&[0, 1, 2]).unwrap();
        assert_eq!(ledger.state(), LedgerState::Empty);
    }

    #[test]
    fn delete_by_id_survives_later_appends() {
        let mut ledger = sample_ledger();
        let selected = ledger.get(1).map(|entry| entry.id).unwrap();
        ledger
            .append(Entry::new(
                EntryKind::Expense,
                "Cinema",
                Category::Leisure,
                PaymentMethod::Debit,
                dec(3000),
            ))
            .unwrap();
        ledger.delete_by_indices(&[0]).unwrap();

        assert_eq!(ledger.delete_by_ids(&[selected]).unwrap(), 1);
        assert_eq!(descriptions(&ledger), vec!["Bus", "Cinema"]);
    }

    #[test]
    fn delete_by_unknown_id_is_rejected() {
        let mut ledger = sample_ledger();
        let known = ledger.get(0).map(|entry| entry.id).unwrap();
        let stranger = EntryId::new();
        let err = ledger.delete_by_ids(&[known, stranger]).unwrap_err();
        assert_eq!(err, LedgerError::UnknownEntry(stranger));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn prefix_lookup_finds_single_entry() {
        let ledger = sample_ledger();
        let target = ledger.get(2).unwrap().id;
        assert_eq!(ledger.find_by_prefix(&target.short()), Some(target));
        assert_eq!(ledger.find_by_prefix("zzzz"), None);
    }

    #[test]
    fn breakdown_totals_cover_every_entry() {
        let ledger = sample_ledger();
        let total: Decimal = ledger.entries().iter().map(|entry| entry.amount).sum();
        for dimension in Dimension::ALL {
            assert_eq!(ledger.aggregate(dimension).total(), total, "{dimension}");
        }
    }

    #[test]
    fn balance_is_independent_of_append_order() {
        let forward = sample_ledger();
        let mut reversed = Ledger::new();
        for entry in forward.entries().iter().rev() {
            reversed.append(entry.clone()).unwrap();
        }
        assert_eq!(forward.net_balance(), reversed.net_balance());
        assert_eq!(forward.totals().balance(), forward.net_balance());
    }

    #[test]
    fn append_rejects_amounts_that_overflow_the_total() {
        let mut ledger = Ledger::new();
        let max = |kind| {
            Entry::new(kind, "Max", Category::Other, PaymentMethod::Cash, Decimal::MAX)
        };
        ledger.append(max(EntryKind::Income)).unwrap();
        let err = ledger.append(max(EntryKind::Expense)).unwrap_err();
        assert_eq!(err, LedgerError::TotalOverflow(Decimal::MAX));
        assert_eq!(ledger.len(), 1);

        assert_eq!(ledger.net_balance(), Decimal::MAX);
        assert_eq!(ledger.aggregate(Dimension::Type).total(), Decimal::MAX);
        let free = Entry {
            amount: Decimal::ZERO,
            ..max(EntryKind::Expense)
        };
        ledger.append(free).unwrap();
        assert_eq!(ledger.totals().balance(), Decimal::MAX);
    }
}
