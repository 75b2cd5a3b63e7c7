//! Append-only ledger file.
//!
//! One entry per line in the `type,day,stock,shares,price,cash_flow` format.
//! The file is created if missing and never truncated, so several runs can
//! share one ledger.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::error::SimtraderError;
use crate::domain::ledger::LedgerEntry;
use crate::ports::ledger_port::LedgerSink;

pub struct FileLedger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileLedger {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SimtraderError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SimtraderError::Ledger {
                reason: format!("failed to open {}: {}", path.display(), e),
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, e: std::io::Error) -> SimtraderError {
        SimtraderError::Ledger {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        }
    }
}

impl LedgerSink for FileLedger {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), SimtraderError> {
        // flushed per entry so a failed run still leaves every trade it made
        writeln!(self.writer, "{}", entry)
            .and_then(|_| self.writer.flush())
            .map_err(|e| self.write_error(e))
    }
}

/// Read a persisted ledger back into entries. Blank lines are skipped.
pub fn read_ledger<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerEntry>, SimtraderError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SimtraderError::Ledger {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut entries = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SimtraderError::Ledger {
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = record.position().map_or(entries.len() + 1, |p| p.line() as usize);
        entries.push(LedgerEntry::from_record(&record, line)?);
    }
    Ok(entries)
}
