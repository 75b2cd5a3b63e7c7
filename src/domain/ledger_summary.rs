//! Aggregate figures computed from a ledger.

use std::collections::BTreeMap;

use super::error::SimtraderError;
use super::ledger::{LedgerEntry, TransactionKind};

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub transactions: usize,
    /// Money paid out for buys, fees included, as a positive amount.
    pub total_spent: f64,
    pub total_earned: f64,
    pub net: f64,
    /// Shares per stock after every transaction before `last_day`.
    pub holdings_before_last_day: BTreeMap<usize, u64>,
    /// Stocks still holding shares once the ledger ends; these could not be sold.
    pub stranded: BTreeMap<usize, u64>,
    /// Running cash balance: entry 0 is before day 0, entry d+1 is after day d.
    pub daily_cash: Vec<f64>,
    pub per_stock_return: BTreeMap<usize, f64>,
}

impl LedgerSummary {
    /// Summarise `entries` over a horizon ending at `last_day`.
    ///
    /// Fails when replaying the buys overflows a position.
    pub fn compute(entries: &[LedgerEntry], last_day: usize) -> Result<Self, SimtraderError> {
        let mut total_spent = 0.0;
        let mut total_earned = 0.0;
        let mut per_stock_return: BTreeMap<usize, f64> = BTreeMap::new();
        let mut daily_flow = vec![0.0; last_day + 1];

        for entry in entries {
            match entry.kind {
                TransactionKind::Buy => total_spent += -entry.cash_flow,
                TransactionKind::Sell => total_earned += entry.cash_flow,
            }
            *per_stock_return.entry(entry.stock).or_insert(0.0) += entry.cash_flow;
            if let Some(flow) = daily_flow.get_mut(entry.day) {
                *flow += entry.cash_flow;
            }
        }

        let mut daily_cash = Vec::with_capacity(daily_flow.len() + 1);
        daily_cash.push(0.0);
        for flow in daily_flow {
            let previous = daily_cash.last().copied().unwrap_or(0.0);
            daily_cash.push(previous + flow);
        }

        let holdings_before_last_day =
            replay(entries.iter().filter(|entry| entry.day < last_day))?;
        let stranded = replay(entries.iter())?
            .into_iter()
            .filter(|(_, shares)| *shares != 0)
            .collect();

        Ok(LedgerSummary {
            transactions: entries.len(),
            total_spent,
            total_earned,
            net: total_earned - total_spent,
            holdings_before_last_day,
            stranded,
            daily_cash,
            per_stock_return,
        })
    }

    /// Cash balance once the last day is done.
    pub fn final_cash(&self) -> f64 {
        self.daily_cash.last().copied().unwrap_or(0.0)
    }

    /// Largest fall of the cash balance from an earlier peak, as a positive amount.
    pub fn max_drawdown(&self) -> f64 {
        let mut peak = f64::NEG_INFINITY;
        let mut worst = 0.0_f64;
        for &cash in &self.daily_cash {
            peak = peak.max(cash);
            worst = worst.max(peak - cash);
        }
        worst
    }

    /// Last day mentioned in the ledger, for callers that do not know the horizon.
    pub fn last_day_of(entries: &[LedgerEntry]) -> usize {
        entries.iter().map(|entry| entry.day).max().unwrap_or(0)
    }
}

fn replay<'a>(
    entries: impl Iterator<Item = &'a LedgerEntry>,
) -> Result<BTreeMap<usize, u64>, SimtraderError> {
    let mut holdings = BTreeMap::new();
    for entry in entries {
        let held = holdings.entry(entry.stock).or_insert(0u64);
        match entry.kind {
            TransactionKind::Buy => {
                *held = held
                    .checked_add(entry.shares)
                    .ok_or_else(|| SimtraderError::Ledger {
                        reason: format!(
                            "stock {} holds more shares than can be counted after day {}",
                            entry.stock, entry.day
                        ),
                    })?;
            }
            TransactionKind::Sell => *held = 0,
        }
    }
    Ok(holdings)
}
