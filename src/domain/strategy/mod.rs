//! Strategy engine: policies and the trading session they drive.
//!
//! Every run follows the same shape:
//! 1. buy every stock on day 0 with `amount` each
//! 2. let the policy walk the days and trade
//! 3. on the last day, sell every listed stock still held (terminal flush)
//!
//! A delisted stock can be neither bought nor sold; shares held when the
//! company failed stay in the portfolio and are reported as stranded.

pub mod crossing;
pub mod momentum;
pub mod random;

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::domain::error::SimtraderError;
use crate::domain::execution::{self, create_portfolio};
use crate::domain::portfolio::Portfolio;
use crate::domain::price::{PriceMatrix, Quote};
use crate::ports::ledger_port::LedgerSink;

pub use crossing::CrossingAverages;
pub use momentum::Momentum;
pub use random::RandomPolicy;

pub const DEFAULT_AMOUNT: f64 = 5000.0;
pub const DEFAULT_FEES: f64 = 20.0;

/// Capital per purchase and the flat fee per trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub amount: f64,
    pub fees: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            amount: DEFAULT_AMOUNT,
            fees: DEFAULT_FEES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyName {
    Random,
    CrossingAverages,
    Momentum,
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyName::Random => write!(f, "random"),
            StrategyName::CrossingAverages => write!(f, "crossing_averages"),
            StrategyName::Momentum => write!(f, "momentum"),
        }
    }
}

impl FromStr for StrategyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "random" => Ok(StrategyName::Random),
            "crossing_averages" | "crossing" => Ok(StrategyName::CrossingAverages),
            "momentum" => Ok(StrategyName::Momentum),
            other => Err(format!(
                "unknown strategy '{other}' (expected random, crossing_averages or momentum)"
            )),
        }
    }
}

/// A decision policy. `trade` runs after the initial purchase and before the
/// terminal flush.
pub trait Policy {
    fn name(&self) -> StrategyName;
    fn trade(&mut self, session: &mut Session<'_>) -> Result<(), SimtraderError>;
}

/// Mutable state of one strategy run: the portfolio and its ledger.
pub struct Session<'a> {
    prices: &'a PriceMatrix,
    params: StrategyParams,
    portfolio: Portfolio,
    ledger: &'a mut dyn LedgerSink,
    buys: usize,
    sells: usize,
}

impl<'a> Session<'a> {
    /// Open a run by buying every stock on day 0.
    pub fn open(
        prices: &'a PriceMatrix,
        params: StrategyParams,
        ledger: &'a mut dyn LedgerSink,
    ) -> Result<Self, SimtraderError> {
        let allocations = vec![params.amount; prices.stocks()];
        let portfolio = create_portfolio(&allocations, prices, params.fees, ledger)?;
        let buys = (0..prices.stocks())
            .filter(|&stock| !prices.price(0, stock).is_delisted())
            .count();
        Ok(Session {
            prices,
            params,
            portfolio,
            ledger,
            buys,
            sells: 0,
        })
    }

    pub fn prices(&self) -> &PriceMatrix {
        self.prices
    }

    pub fn days(&self) -> usize {
        self.prices.days()
    }

    pub fn stocks(&self) -> usize {
        self.prices.stocks()
    }

    pub fn quote(&self, day: usize, stock: usize) -> Quote {
        self.prices.price(day, stock)
    }

    pub fn is_holding(&self, stock: usize) -> bool {
        self.portfolio.is_holding(stock)
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn buy(&mut self, day: usize, stock: usize) -> Result<(), SimtraderError> {
        execution::buy(
            day,
            stock,
            self.params.amount,
            self.prices,
            self.params.fees,
            &mut self.portfolio,
            self.ledger,
        )?;
        self.buys += 1;
        Ok(())
    }

    pub fn sell(&mut self, day: usize, stock: usize) -> Result<(), SimtraderError> {
        execution::sell(
            day,
            stock,
            self.prices,
            self.params.fees,
            &mut self.portfolio,
            self.ledger,
        )?;
        self.sells += 1;
        Ok(())
    }

    /// Sell every listed, non-empty position on the last day and close the run.
    pub fn finish(mut self, name: StrategyName) -> Result<RunSummary, SimtraderError> {
        let last_day = self.prices.last_day();
        for stock in 0..self.stocks() {
            if !self.quote(last_day, stock).is_delisted() && self.is_holding(stock) {
                self.sell(last_day, stock)?;
            }
        }

        let stranded = self.portfolio.open_positions();
        for (stock, shares) in &stranded {
            warn!(stock, shares, "delisted, shares cannot be sold");
        }

        Ok(RunSummary {
            strategy: name,
            days: self.prices.days(),
            buys: self.buys,
            sells: self.sells,
            stranded,
            portfolio: self.portfolio,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub strategy: StrategyName,
    pub days: usize,
    pub buys: usize,
    pub sells: usize,
    /// `(stock, shares)` left in delisted companies.
    pub stranded: Vec<(usize, u64)>,
    pub portfolio: Portfolio,
}

/// A fully configured policy, as read from the `[strategy]` section.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    Random { period: usize, seed: Option<u64> },
    CrossingAverages(CrossingAverages),
    Momentum(Momentum),
}

impl StrategyKind {
    pub fn name(&self) -> StrategyName {
        match self {
            StrategyKind::Random { .. } => StrategyName::Random,
            StrategyKind::CrossingAverages(_) => StrategyName::CrossingAverages,
            StrategyKind::Momentum(_) => StrategyName::Momentum,
        }
    }
}

/// Run the configured policy. A random policy without a seed draws one from
/// the operating system.
pub fn run_strategy(
    kind: &StrategyKind,
    prices: &PriceMatrix,
    params: StrategyParams,
    ledger: &mut dyn LedgerSink,
) -> Result<RunSummary, SimtraderError> {
    match kind {
        StrategyKind::Random { period, seed } => {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            run_policy(&mut RandomPolicy::new(*period, rng)?, prices, params, ledger)
        }
        StrategyKind::CrossingAverages(policy) => run_policy(&mut { *policy }, prices, params, ledger),
        StrategyKind::Momentum(policy) => run_policy(&mut { *policy }, prices, params, ledger),
    }
}

/// Run one policy over the whole horizon, recording every trade in `ledger`.
pub fn run_policy(
    policy: &mut dyn Policy,
    prices: &PriceMatrix,
    params: StrategyParams,
    ledger: &mut dyn LedgerSink,
) -> Result<RunSummary, SimtraderError> {
    let name = policy.name();
    info!(
        strategy = %name,
        stocks = prices.stocks(),
        days = prices.days(),
        "starting run"
    );

    let mut session = Session::open(prices, params, ledger)?;
    policy.trade(&mut session)?;
    let summary = session.finish(name)?;

    info!(
        strategy = %name,
        buys = summary.buys,
        sells = summary.sells,
        stranded = summary.stranded.len(),
        "run complete"
    );
    Ok(summary)
}
