use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::EntryId;

/// Error type that captures ledger failures. Every variant is recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0} (amounts must be zero or positive)")]
    InvalidAmount(Decimal),
    #[error("Entry index {index} is out of range (ledger has {len} entries)")]
    OutOfRange { index: i64, len: usize },
    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryId),
    #[error("Amount {0} would push the ledger total past the supported maximum")]
    TotalOverflow(Decimal),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
