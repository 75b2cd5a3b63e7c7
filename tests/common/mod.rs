#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use simtrader::domain::error::SimtraderError;
use simtrader::domain::generator::generate_price_matrix;
use simtrader::domain::ledger::LedgerEntry;
pub use simtrader::domain::price::{PriceMatrix, PricePath, Quote};
use simtrader::ports::ledger_port::LedgerSink;
use std::io::Write;

pub fn listed(prices: &[f64]) -> PricePath {
    PricePath::fully_listed(prices.to_vec())
}

pub fn matrix(paths: Vec<PricePath>) -> PriceMatrix {
    PriceMatrix::from_paths(paths).unwrap()
}

/// Seeded synthetic prices: a mix of cheap, volatile stocks that tend to
/// fail and steadier ones that survive.
pub fn generated_matrix(seed: u64, days: usize) -> PriceMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_price_matrix(
        days,
        Some(&[5.0, 50.0, 100.0, 200.0]),
        Some(&[2.0, 1.0, 2.5, 4.0]),
        1.0,
        &mut rng,
    )
    .unwrap()
}

/// A sine-shaped path that keeps crossing its own averages.
pub fn wave(days: usize, base: f64, amplitude: f64, period: f64) -> PricePath {
    let prices = (0..days)
        .map(|d| base + amplitude * (d as f64 * std::f64::consts::TAU / period).sin())
        .collect();
    PricePath::fully_listed(prices)
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Accepts `limit` entries, then fails every append.
pub struct FailingLedger {
    pub limit: usize,
    pub accepted: Vec<LedgerEntry>,
}

impl FailingLedger {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            accepted: Vec::new(),
        }
    }
}

impl LedgerSink for FailingLedger {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), SimtraderError> {
        if self.accepted.len() >= self.limit {
            return Err(SimtraderError::Ledger {
                reason: "disk full".into(),
            });
        }
        self.accepted.push(entry.clone());
        Ok(())
    }
}
