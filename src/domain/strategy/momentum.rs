//! Momentum trading on a smoothed oscillator.
//!
//! The oscillator (stochastic or RSI over `window` days) is smoothed with a
//! 3-day moving average. Each day, per stock:
//! - above `overbought` and holding: sell
//! - otherwise below `oversold` and the cool-off has elapsed: buy and restart
//!   the cool-off
//!
//! Cool-off counters start elapsed, so the first oversold day can buy.

use tracing::{debug, warn};

use super::{Policy, Session, StrategyName};
use crate::domain::error::SimtraderError;
use crate::domain::indicator::{oscillator, smooth_readings, OscillatorKind, Reading};

pub const SMOOTHING_PERIOD: usize = 3;
pub const DEFAULT_WINDOW: usize = 7;
pub const DEFAULT_OVERBOUGHT: f64 = 0.8;
pub const DEFAULT_OVERSOLD: f64 = 0.2;
pub const DEFAULT_COOL_OFF_PERIOD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    kind: OscillatorKind,
    window: usize,
    overbought: f64,
    oversold: f64,
    cool_off_period: usize,
}

impl Default for Momentum {
    fn default() -> Self {
        Momentum {
            kind: OscillatorKind::default(),
            window: DEFAULT_WINDOW,
            overbought: DEFAULT_OVERBOUGHT,
            oversold: DEFAULT_OVERSOLD,
            cool_off_period: DEFAULT_COOL_OFF_PERIOD,
        }
    }
}

impl Momentum {
    pub fn new(
        kind: OscillatorKind,
        window: usize,
        overbought: f64,
        oversold: f64,
        cool_off_period: usize,
    ) -> Result<Self, SimtraderError> {
        if window < 2 {
            return Err(SimtraderError::invalid(
                "strategy",
                "window",
                "must be at least 2",
            ));
        }
        for (key, value) in [("overbought", overbought), ("oversold", oversold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimtraderError::invalid(
                    "strategy",
                    key,
                    format!("{value} is outside [0, 1]"),
                ));
            }
        }
        if (overbought + oversold - 1.0).abs() > 1e-9 {
            warn!(
                overbought,
                oversold, "thresholds are not symmetric (overbought + oversold != 1)"
            );
        }
        Ok(Momentum {
            kind,
            window,
            overbought,
            oversold,
            cool_off_period,
        })
    }

    pub fn kind(&self) -> OscillatorKind {
        self.kind
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn cool_off_period(&self) -> usize {
        self.cool_off_period
    }
}

impl Policy for Momentum {
    fn name(&self) -> StrategyName {
        StrategyName::Momentum
    }

    fn trade(&mut self, session: &mut Session<'_>) -> Result<(), SimtraderError> {
        let smoothed: Vec<_> = session
            .prices()
            .paths()
            .iter()
            .map(|path| smooth_readings(&oscillator(path, self.window, self.kind), SMOOTHING_PERIOD))
            .collect();
        let start = self.window - 1 + SMOOTHING_PERIOD - 1;
        let mut cool_off = vec![self.cool_off_period; session.stocks()];
        let mut active = vec![true; session.stocks()];

        for day in start..session.days() {
            for counter in cool_off.iter_mut().filter(|c| **c < self.cool_off_period) {
                *counter += 1;
            }

            for (stock, series) in smoothed.iter().enumerate() {
                if !active[stock] {
                    continue;
                }
                let value = match series.at_day(day) {
                    Some(Reading::Defined(v)) if !session.quote(day, stock).is_delisted() => v,
                    Some(Reading::Undefined) => continue,
                    _ => {
                        debug!(day, stock, "no longer tradable, skipping for the rest of the run");
                        active[stock] = false;
                        continue;
                    }
                };

                if value > self.overbought && session.is_holding(stock) {
                    session.sell(day, stock)?;
                } else if value < self.oversold && cool_off[stock] == self.cool_off_period {
                    session.buy(day, stock)?;
                    cool_off[stock] = 0;
                }
            }
        }
        Ok(())
    }
}
