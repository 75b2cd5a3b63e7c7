//! Crossing moving averages.
//!
//! On day d the policy compares the fast (m) and slow (n) averages ending on
//! day d-1 with those ending on day d-2. A fast average crossing up through
//! the slow one buys; crossing down sells if the stock is held. Trading
//! starts on day n+1, the first day both averages exist for d-2.

use tracing::debug;

use super::{Policy, Session, StrategyName};
use crate::domain::error::SimtraderError;
use crate::domain::indicator::{moving_average, IndicatorSeries};

pub const DEFAULT_FAST: usize = 50;
pub const DEFAULT_SLOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
}

/// Golden cross buys, death cross sells.
pub fn crossing_signal(fast_prev: f64, slow_prev: f64, fast_now: f64, slow_now: f64) -> Option<Signal> {
    if fast_now >= slow_now && fast_prev < slow_prev {
        Some(Signal::Buy)
    } else if fast_now <= slow_now && fast_prev > slow_prev {
        Some(Signal::Sell)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingAverages {
    fast: usize,
    slow: usize,
}

impl CrossingAverages {
    pub fn new(fast: usize, slow: usize) -> Result<Self, SimtraderError> {
        if fast == 0 {
            return Err(SimtraderError::invalid("strategy", "fast", "must be at least 1"));
        }
        if fast >= slow {
            return Err(SimtraderError::invalid(
                "strategy",
                "fast",
                format!("fast period {fast} must be shorter than slow period {slow}"),
            ));
        }
        Ok(CrossingAverages { fast, slow })
    }

    pub fn fast(&self) -> usize {
        self.fast
    }

    pub fn slow(&self) -> usize {
        self.slow
    }
}

struct Averages {
    fast: IndicatorSeries<f64>,
    slow: IndicatorSeries<f64>,
}

impl Averages {
    /// `(fast_prev, slow_prev, fast_now, slow_now)` for a trading day.
    fn around(&self, day: usize) -> Option<(f64, f64, f64, f64)> {
        Some((
            self.fast.at_day(day - 2)?,
            self.slow.at_day(day - 2)?,
            self.fast.at_day(day - 1)?,
            self.slow.at_day(day - 1)?,
        ))
    }
}

impl Policy for CrossingAverages {
    fn name(&self) -> StrategyName {
        StrategyName::CrossingAverages
    }

    fn trade(&mut self, session: &mut Session<'_>) -> Result<(), SimtraderError> {
        let averages = session
            .prices()
            .paths()
            .iter()
            .map(|path| {
                Ok(Averages {
                    fast: moving_average(path, self.fast, None)?,
                    slow: moving_average(path, self.slow, None)?,
                })
            })
            .collect::<Result<Vec<_>, SimtraderError>>()?;
        let mut active = vec![true; session.stocks()];

        for day in self.slow + 1..session.days() {
            for (stock, series) in averages.iter().enumerate() {
                if !active[stock] {
                    continue;
                }
                let window = series.around(day);
                let (Some((fast_prev, slow_prev, fast_now, slow_now)), false) =
                    (window, session.quote(day, stock).is_delisted())
                else {
                    debug!(day, stock, "no longer tradable, skipping for the rest of the run");
                    active[stock] = false;
                    continue;
                };

                match crossing_signal(fast_prev, slow_prev, fast_now, slow_now) {
                    Some(Signal::Buy) => session.buy(day, stock)?,
                    Some(Signal::Sell) if session.is_holding(stock) => session.sell(day, stock)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
