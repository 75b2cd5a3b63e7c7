//! Buy and sell primitives.
//!
//! Every trade pays a flat fee. A buy spends at most the capital it is
//! offered, fees included, on whole shares; leftover capital is not carried
//! anywhere. A sell always liquidates the whole position in one entry.

use tracing::{debug, warn};

use super::error::{SimtraderError, TradeError};
use super::ledger::{log_transaction, LedgerEntry, TransactionKind};
use super::portfolio::Portfolio;
use super::price::PriceMatrix;
use crate::ports::ledger_port::LedgerSink;

fn listed_price(prices: &PriceMatrix, day: usize, stock: usize) -> Result<f64, TradeError> {
    if stock >= prices.stocks() {
        return Err(TradeError::UnknownStock {
            stock,
            stocks: prices.stocks(),
        });
    }
    if day >= prices.days() {
        return Err(TradeError::UnknownDay {
            day,
            days: prices.days(),
        });
    }
    prices
        .price(day, stock)
        .listed()
        .ok_or(TradeError::Delisted { stock, day })
}

/// Whole shares affordable with `capital` after paying `fees`.
pub fn affordable_shares(capital: f64, fees: f64, price: f64) -> Result<u64, TradeError> {
    if capital < fees {
        return Err(TradeError::InsufficientCapital { capital, fees });
    }
    let count = ((capital - fees) / price).floor();
    // u64::MAX as f64 rounds up to 2^64, so anything below it fits
    if !(count < u64::MAX as f64) {
        return Err(TradeError::TooManyShares { count, price });
    }
    let mut shares = count as u64;
    // float division can round up onto the next whole share
    while shares > 0 && shares as f64 * price + fees > capital {
        shares -= 1;
    }
    Ok(shares)
}

/// Buy as many shares as `capital` allows, fees included.
pub fn buy(
    day: usize,
    stock: usize,
    capital: f64,
    prices: &PriceMatrix,
    fees: f64,
    portfolio: &mut Portfolio,
    ledger: &mut dyn LedgerSink,
) -> Result<LedgerEntry, SimtraderError> {
    let price = listed_price(prices, day, stock)?;
    let shares = affordable_shares(capital, fees, price)?;
    portfolio.after_buy(stock, shares)?;

    let entry = log_transaction(TransactionKind::Buy, day, stock, shares, price, fees, ledger)?;
    portfolio.add(stock, shares)?;
    debug!(day, stock, shares, price, "buy");
    Ok(entry)
}

/// Sell the whole position. A flat position records a zero-share entry.
pub fn sell(
    day: usize,
    stock: usize,
    prices: &PriceMatrix,
    fees: f64,
    portfolio: &mut Portfolio,
    ledger: &mut dyn LedgerSink,
) -> Result<LedgerEntry, SimtraderError> {
    let price = listed_price(prices, day, stock)?;
    let shares = portfolio.shares(stock);

    let entry = log_transaction(TransactionKind::Sell, day, stock, shares, price, fees, ledger)?;
    portfolio.clear(stock);
    debug!(day, stock, shares, price, "sell");
    Ok(entry)
}

/// Buy every stock on day 0 with its own allocation.
///
/// A stock already delisted on day 0 cannot be bought and stays flat.
pub fn create_portfolio(
    allocations: &[f64],
    prices: &PriceMatrix,
    fees: f64,
    ledger: &mut dyn LedgerSink,
) -> Result<Portfolio, SimtraderError> {
    if allocations.len() != prices.stocks() {
        return Err(SimtraderError::Shape {
            reason: format!(
                "{} allocations for {} stocks",
                allocations.len(),
                prices.stocks()
            ),
        });
    }

    let mut portfolio = Portfolio::new(prices.stocks());
    for (stock, &capital) in allocations.iter().enumerate() {
        match buy(0, stock, capital, prices, fees, &mut portfolio, ledger) {
            Ok(_) => {}
            Err(SimtraderError::Trade(TradeError::Delisted { .. })) => {
                warn!(stock, "delisted on day 0, not bought");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(portfolio)
}
