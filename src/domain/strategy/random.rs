//! Random trading: every `period` days, each stock independently buys,
//! holds or sells with equal probability.

use rand::Rng;
use tracing::trace;

use super::{Policy, Session, StrategyName};
use crate::domain::error::SimtraderError;

pub const DEFAULT_TRADE_PERIOD: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Buy,
    Hold,
    Sell,
}

/// The random stream is owned by the policy so a seeded run is reproducible.
#[derive(Debug, Clone)]
pub struct RandomPolicy<R> {
    period: usize,
    rng: R,
}

impl<R: Rng> RandomPolicy<R> {
    pub fn new(period: usize, rng: R) -> Result<Self, SimtraderError> {
        if period == 0 {
            return Err(SimtraderError::invalid(
                "strategy",
                "period",
                "must be at least 1",
            ));
        }
        Ok(RandomPolicy { period, rng })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn draw(&mut self) -> Action {
        match self.rng.gen_range(0..3) {
            0 => Action::Buy,
            1 => Action::Hold,
            _ => Action::Sell,
        }
    }
}

impl<R: Rng> Policy for RandomPolicy<R> {
    fn name(&self) -> StrategyName {
        StrategyName::Random
    }

    fn trade(&mut self, session: &mut Session<'_>) -> Result<(), SimtraderError> {
        for day in (self.period..session.days()).step_by(self.period) {
            for stock in 0..session.stocks() {
                // one draw per stock per trade day, listed or not
                let action = self.draw();
                if session.quote(day, stock).is_delisted() {
                    continue;
                }
                trace!(day, stock, ?action, "random draw");
                match action {
                    Action::Buy => session.buy(day, stock)?,
                    Action::Sell if session.is_holding(stock) => session.sell(day, stock)?,
                    Action::Sell | Action::Hold => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_ledger_adapter::MemoryLedger;
    use crate::domain::ledger::TransactionKind;
    use crate::domain::price::{PriceMatrix, PricePath};
    use crate::domain::strategy::{run_policy, StrategyParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn prices(days: usize) -> PriceMatrix {
        PriceMatrix::from_paths(vec![
            PricePath::fully_listed((0..days).map(|d| 100.0 + d as f64).collect()),
            PricePath::fully_listed((0..days).map(|d| 50.0 + (d % 5) as f64).collect()),
            PricePath::new((0..days / 2).map(|d| 20.0 + d as f64).collect(), days),
        ])
        .unwrap()
    }

    fn run(seed: u64, period: usize, days: usize) -> Vec<String> {
        let prices = prices(days);
        let mut policy = RandomPolicy::new(period, StdRng::seed_from_u64(seed)).unwrap();
        let mut ledger = MemoryLedger::new();
        run_policy(&mut policy, &prices, StrategyParams::default(), &mut ledger).unwrap();
        ledger.lines()
    }

    #[test]
    fn rejects_zero_period() {
        assert!(RandomPolicy::new(0, StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn same_seed_same_ledger() {
        assert_eq!(run(42, 7, 100), run(42, 7, 100));
    }

    #[test]
    fn trades_only_on_period_multiples() {
        let prices = prices(60);
        let mut policy = RandomPolicy::new(7, StdRng::seed_from_u64(3)).unwrap();
        let mut ledger = MemoryLedger::new();
        run_policy(&mut policy, &prices, StrategyParams::default(), &mut ledger).unwrap();

        let last_day = prices.last_day();
        for entry in ledger.entries() {
            assert!(
                entry.day == 0 || entry.day == last_day || entry.day % 7 == 0,
                "unexpected trade day {}",
                entry.day
            );
        }
    }

    #[test]
    fn never_trades_delisted_stock() {
        let prices = prices(60);
        let failure = prices.path(2).and_then(PricePath::failure_day).unwrap();
        let mut policy = RandomPolicy::new(3, StdRng::seed_from_u64(11)).unwrap();
        let mut ledger = MemoryLedger::new();
        run_policy(&mut policy, &prices, StrategyParams::default(), &mut ledger).unwrap();

        assert!(ledger
            .entries()
            .iter()
            .filter(|e| e.stock == 2)
            .all(|e| e.day < failure));
    }

    #[test]
    fn sells_only_held_positions() {
        let prices = prices(200);
        let mut policy = RandomPolicy::new(2, StdRng::seed_from_u64(5)).unwrap();
        let mut ledger = MemoryLedger::new();
        run_policy(&mut policy, &prices, StrategyParams::default(), &mut ledger).unwrap();

        assert!(ledger
            .entries()
            .iter()
            .filter(|e| e.kind == TransactionKind::Sell)
            .all(|e| e.shares > 0));
    }

    #[test]
    fn period_longer_than_horizon_only_opens_and_flushes() {
        let lines = run(9, 50, 20);
        // three day-0 buys, two flushes; stock 2 failed on day 10
        assert_eq!(lines.len(), 5);
    }
}
