//! Nearest-match selection of stocks from a historical price table.
//!
//! The table's header row holds each stock's volatility; the first price row
//! doubles as each stock's initial price. Callers ask for stocks by target
//! initial price or target volatility and get, per target, the column whose
//! value is closest (first column on ties).

use tracing::{info, warn};

use crate::domain::error::SimtraderError;
use crate::domain::price::PriceMatrix;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalTable {
    volatilities: Vec<f64>,
    /// Days × stocks; row 0 is the initial price of every stock.
    rows: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriterion {
    All,
    InitialPrice,
    Volatility,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub matrix: PriceMatrix,
    pub columns: Vec<usize>,
    pub initial_prices: Vec<f64>,
    pub volatilities: Vec<f64>,
    pub criterion: SelectionCriterion,
    /// Both targets were given; volatility targets played no part.
    pub volatility_ignored: bool,
}

impl HistoricalTable {
    /// Split raw file rows into the volatility header and the price rows.
    pub fn from_raw_rows(mut raw: Vec<Vec<f64>>) -> Result<Self, SimtraderError> {
        if raw.len() < 2 {
            return Err(SimtraderError::DataFormat {
                reason: format!(
                    "expected a volatility row and at least one price row, got {} rows",
                    raw.len()
                ),
            });
        }
        let volatilities = raw.remove(0);
        if let Some((i, row)) = raw
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != volatilities.len())
        {
            return Err(SimtraderError::DataFormat {
                reason: format!(
                    "price row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    volatilities.len()
                ),
            });
        }
        Ok(HistoricalTable {
            volatilities,
            rows: raw,
        })
    }

    pub fn stocks(&self) -> usize {
        self.volatilities.len()
    }

    pub fn volatilities(&self) -> &[f64] {
        &self.volatilities
    }

    /// Price rows, one per day, each exactly `stocks()` wide.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn initial_prices(&self) -> &[f64] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn select(
        &self,
        initial_prices: Option<&[f64]>,
        volatilities: Option<&[f64]>,
    ) -> Result<Selection, SimtraderError> {
        let (criterion, targets, volatility_ignored) = match (initial_prices, volatilities) {
            (None, None) => (SelectionCriterion::All, &[][..], false),
            (Some(p), None) => (SelectionCriterion::InitialPrice, p, false),
            (None, Some(v)) => (SelectionCriterion::Volatility, v, false),
            (Some(p), Some(_)) => (SelectionCriterion::InitialPrice, p, true),
        };

        let columns: Vec<usize> = match criterion {
            SelectionCriterion::All => (0..self.stocks()).collect(),
            SelectionCriterion::InitialPrice => targets
                .iter()
                .map(|&t| nearest(self.initial_prices(), t))
                .collect::<Option<_>>()
                .ok_or_else(no_candidates)?,
            SelectionCriterion::Volatility => targets
                .iter()
                .map(|&t| nearest(&self.volatilities, t))
                .collect::<Option<_>>()
                .ok_or_else(no_candidates)?,
        };
        if columns.is_empty() {
            return Err(SimtraderError::invalid(
                "data",
                "initial_prices",
                "no stocks requested",
            ));
        }

        let rows: Vec<Vec<f64>> = self
            .rows
            .iter()
            .map(|row| columns.iter().map(|&c| row[c]).collect())
            .collect();
        let matrix = PriceMatrix::from_rows(&rows)?;

        let initial_prices: Vec<f64> = columns.iter().map(|&c| self.initial_prices()[c]).collect();
        let volatilities: Vec<f64> = columns.iter().map(|&c| self.volatilities[c]).collect();

        if criterion != SelectionCriterion::All {
            info!(
                ?initial_prices,
                ?volatilities,
                "found data with nearest initial prices and volatilities"
            );
        }
        if volatility_ignored {
            warn!("both targets given; selected by initial price, volatility ignored");
        }

        Ok(Selection {
            matrix,
            columns,
            initial_prices,
            volatilities,
            criterion,
            volatility_ignored,
        })
    }
}

fn no_candidates() -> SimtraderError {
    SimtraderError::DataFormat {
        reason: "table has no comparable values to match against".into(),
    }
}

/// Index of the first value closest to `target`, ignoring NaN.
fn nearest(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, v)| {
            let distance = (v - target).abs();
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((i, distance)),
            }
        })
        .map(|(i, _)| i)
}
