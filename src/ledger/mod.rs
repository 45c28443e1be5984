//! In-memory ledger model: entries, the ordered store, and aggregation.

pub mod aggregate;
pub mod entry;
#[allow(clippy::module_inception)]
pub mod ledger;

pub use aggregate::{Breakdown, Dimension, Slice, Totals};
pub use entry::{Category, Entry, EntryId, EntryKind, PaymentMethod};
pub use ledger::{Ledger, LedgerState};
