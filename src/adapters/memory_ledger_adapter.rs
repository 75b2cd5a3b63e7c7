//! In-memory ledger, for tests and dry runs.

use crate::domain::error::SimtraderError;
use crate::domain::ledger::LedgerEntry;
use crate::ports::ledger_port::LedgerSink;

#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries rendered in the persisted line format.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(LedgerEntry::to_string).collect()
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }
}

impl LedgerSink for MemoryLedger {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), SimtraderError> {
        self.entries.push(entry.clone());
        Ok(())
    }
}
