//! Per-stock share holdings.

use super::error::TradeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portfolio {
    holdings: Vec<u64>,
}

impl Portfolio {
    pub fn new(stocks: usize) -> Self {
        Portfolio {
            holdings: vec![0; stocks],
        }
    }

    pub fn stocks(&self) -> usize {
        self.holdings.len()
    }

    pub fn shares(&self, stock: usize) -> u64 {
        self.holdings.get(stock).copied().unwrap_or(0)
    }

    pub fn is_holding(&self, stock: usize) -> bool {
        self.shares(stock) != 0
    }

    /// Position after buying `shares` more of `stock`.
    pub fn after_buy(&self, stock: usize, shares: u64) -> Result<u64, TradeError> {
        self.shares(stock)
            .checked_add(shares)
            .ok_or(TradeError::PositionOverflow { stock })
    }

    pub(crate) fn add(&mut self, stock: usize, shares: u64) -> Result<(), TradeError> {
        let total = self.after_buy(stock, shares)?;
        if let Some(held) = self.holdings.get_mut(stock) {
            *held = total;
        }
        Ok(())
    }

    /// Empty the position, returning the number of shares it held.
    pub(crate) fn clear(&mut self, stock: usize) -> u64 {
        self.holdings
            .get_mut(stock)
            .map(std::mem::take)
            .unwrap_or(0)
    }

    /// `(stock, shares)` for every non-zero position.
    pub fn open_positions(&self) -> Vec<(usize, u64)> {
        self.holdings
            .iter()
            .enumerate()
            .filter(|(_, shares)| **shares != 0)
            .map(|(stock, shares)| (stock, *shares))
            .collect()
    }

    pub fn holdings(&self) -> &[u64] {
        &self.holdings
    }
}
