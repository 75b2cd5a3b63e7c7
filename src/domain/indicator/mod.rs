//! Technical indicators over failure-truncated price paths.
//!
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: values indexed from the first day the indicator is defined
//! - `Reading`: an oscillator value, or `Undefined` when its ratio has no value
//!
//! Every series stops at the first delisted day of its source path. It never
//! contains a failure marker; it is simply shorter.

pub mod moving_average;
pub mod oscillator;

use std::fmt;

pub use moving_average::{moving_average, moving_average_values, smooth_readings};
pub use oscillator::{oscillator, OscillatorKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("expected {expected} weights, got {got}")]
    WeightLength { expected: usize, got: usize },

    #[error("weights sum to zero")]
    ZeroWeightSum,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Defined(f64),
    /// The ratio has no value (flat window); no signal, the company is still listed.
    Undefined,
}

impl Reading {
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Defined(v) => Some(v),
            Reading::Undefined => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Wma(usize),
    Stochastic(usize),
    Rsi(usize),
    /// Moving average of another indicator.
    Smoothed(Box<IndicatorType>, usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Stochastic(period) => write!(f, "STOCHASTIC({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Smoothed(inner, period) => write!(f, "SMA({},{})", inner, period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries<T> {
    pub indicator_type: IndicatorType,
    /// Day of `values[0]`.
    pub first_day: usize,
    pub values: Vec<T>,
}

impl<T: Copy> IndicatorSeries<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied()
    }

    /// Value for a day, `None` before the first defined day or past truncation.
    pub fn at_day(&self, day: usize) -> Option<T> {
        day.checked_sub(self.first_day).and_then(|i| self.get(i))
    }

    /// Last day covered by the series.
    pub fn last_day(&self) -> Option<usize> {
        (!self.values.is_empty()).then(|| self.first_day + self.values.len() - 1)
    }
}
