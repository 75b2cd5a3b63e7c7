//! Ledger sink port trait.

use crate::domain::error::SimtraderError;
use crate::domain::ledger::LedgerEntry;

/// Append-only destination for executed transactions.
///
/// A strategy run owns exactly one sink; entries arrive in execution order.
pub trait LedgerSink {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), SimtraderError>;
}
