//! Ledger entries and their persisted line format.
//!
//! One line per transaction: `type,day,stock,shares,price,cash_flow`, with
//! price and cash flow to 2 decimals. Cash flow is negative for a buy
//! (cost plus fees) and positive for a sell (proceeds minus fees).

use std::fmt;

use csv::StringRecord;
use serde::Deserialize;

use crate::domain::error::SimtraderError;
use crate::ports::ledger_port::LedgerSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "buy"),
            TransactionKind::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerEntry {
    pub kind: TransactionKind,
    pub day: usize,
    pub stock: usize,
    pub shares: u64,
    pub price: f64,
    pub cash_flow: f64,
}

impl LedgerEntry {
    pub fn new(
        kind: TransactionKind,
        day: usize,
        stock: usize,
        shares: u64,
        price: f64,
        fees: f64,
    ) -> Self {
        let value = shares as f64 * price;
        let cash_flow = match kind {
            TransactionKind::Buy => -(value + fees),
            TransactionKind::Sell => value - fees,
        };
        LedgerEntry {
            kind,
            day,
            stock,
            shares,
            price,
            cash_flow,
        }
    }

    /// Parse one persisted ledger line. `line_no` is used for error reporting only.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, SimtraderError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        LedgerEntry::from_record(&StringRecord::from(fields), line_no)
    }

    pub fn from_record(record: &StringRecord, line_no: usize) -> Result<Self, SimtraderError> {
        if record.len() != 6 {
            return Err(SimtraderError::LedgerParse {
                line: line_no,
                reason: format!("expected 6 fields, got {}", record.len()),
            });
        }
        record
            .deserialize(None)
            .map_err(|e| SimtraderError::LedgerParse {
                line: line_no,
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{:.2},{:.2}",
            self.kind, self.day, self.stock, self.shares, self.price, self.cash_flow
        )
    }
}

/// Record a transaction, computing its signed cash flow from the flat fee.
pub fn log_transaction(
    kind: TransactionKind,
    day: usize,
    stock: usize,
    shares: u64,
    price: f64,
    fees: f64,
    ledger: &mut dyn LedgerSink,
) -> Result<LedgerEntry, SimtraderError> {
    let entry = LedgerEntry::new(kind, day, stock, shares, price, fees);
    ledger.append(&entry)?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_ledger_adapter::MemoryLedger;

    #[test]
    fn buy_line_format() {
        let mut ledger = MemoryLedger::new();
        let entry =
            log_transaction(TransactionKind::Buy, 5, 2, 10, 100.0, 50.0, &mut ledger).unwrap();
        assert_eq!(entry.to_string(), "buy,5,2,10,100.00,-1050.00");
        assert_eq!(ledger.lines(), vec!["buy,5,2,10,100.00,-1050.00".to_string()]);
    }

    #[test]
    fn sell_line_format() {
        let entry = LedgerEntry::new(TransactionKind::Sell, 8, 1, 10, 100.0, 20.0);
        assert_eq!(entry.to_string(), "sell,8,1,10,100.00,980.00");
    }

    #[test]
    fn zero_share_sell_records_fee_only() {
        let entry = LedgerEntry::new(TransactionKind::Sell, 3, 0, 0, 42.5, 20.0);
        assert_eq!(entry.to_string(), "sell,3,0,0,42.50,-20.00");
    }

    #[test]
    fn parse_line_reads_persisted_format() {
        let entry = LedgerEntry::parse_line("buy,5,2,10,100.00,-1050.00", 1).unwrap();
        assert_eq!(entry, LedgerEntry::new(TransactionKind::Buy, 5, 2, 10, 100.0, 50.0));
        let entry = LedgerEntry::parse_line(" sell, 8, 1, 10, 100.00, 980.00", 2).unwrap();
        assert_eq!(entry.kind, TransactionKind::Sell);
        assert_eq!(entry.cash_flow, 980.0);
    }

    #[test]
    fn parse_line_rejects_bad_type() {
        let err = LedgerEntry::parse_line("hold,5,2,10,1.00,0.00", 7).unwrap_err();
        assert!(matches!(err, SimtraderError::LedgerParse { line: 7, .. }));
    }

    #[test]
    fn parse_line_rejects_wrong_arity() {
        let err = LedgerEntry::parse_line("buy,5", 2).unwrap_err();
        assert!(matches!(err, SimtraderError::LedgerParse { line: 2, .. }));
    }

    #[test]
    fn parse_line_rejects_negative_shares() {
        assert!(LedgerEntry::parse_line("buy,5,2,-10,100.00,-1050.00", 3).is_err());
    }
}
