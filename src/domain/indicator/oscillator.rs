//! Stochastic and RSI oscillators, both scaled to [0, 1].
//!
//! Stochastic: (P[i] - low) / (high - low) over the n-day window; undefined
//! when the window is flat.
//!
//! RSI: from the n-1 day-over-day changes inside the window,
//! RS = mean(gains) / |mean(losses)| and RSI = 1 - 1 / (1 + RS).
//! Only gains gives 1, only losses gives 0, no changes at all is undefined.
//! This is the plain windowed mean, not Wilder's smoothing.

use std::fmt;
use std::str::FromStr;

use crate::domain::indicator::{IndicatorSeries, IndicatorType, Reading};
use crate::domain::price::PricePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorKind {
    #[default]
    Stochastic,
    Rsi,
}

impl fmt::Display for OscillatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscillatorKind::Stochastic => write!(f, "stochastic"),
            OscillatorKind::Rsi => write!(f, "rsi"),
        }
    }
}

impl FromStr for OscillatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stochastic" => Ok(OscillatorKind::Stochastic),
            "rsi" => Ok(OscillatorKind::Rsi),
            other => Err(format!("unknown oscillator '{other}' (expected stochastic or rsi)")),
        }
    }
}

pub fn oscillator(path: &PricePath, period: usize, kind: OscillatorKind) -> IndicatorSeries<Reading> {
    let values = if period == 0 {
        Vec::new()
    } else {
        path.listed()
            .windows(period)
            .map(|window| match kind {
                OscillatorKind::Stochastic => stochastic(window),
                OscillatorKind::Rsi => rsi(window),
            })
            .collect()
    };

    let indicator_type = match kind {
        OscillatorKind::Stochastic => IndicatorType::Stochastic(period),
        OscillatorKind::Rsi => IndicatorType::Rsi(period),
    };

    IndicatorSeries {
        indicator_type,
        first_day: period.saturating_sub(1),
        values,
    }
}

fn stochastic(window: &[f64]) -> Reading {
    let high = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().copied().fold(f64::INFINITY, f64::min);
    let range = high - low;
    if range == 0.0 {
        return Reading::Undefined;
    }
    let last = window[window.len() - 1];
    Reading::Defined((last - low) / range)
}

fn rsi(window: &[f64]) -> Reading {
    let (mut gain_sum, mut gains) = (0.0, 0usize);
    let (mut loss_sum, mut losses) = (0.0, 0usize);

    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gain_sum += change;
            gains += 1;
        } else if change < 0.0 {
            loss_sum += change;
            losses += 1;
        }
    }

    match (gains, losses) {
        (0, 0) => Reading::Undefined,
        (_, 0) => Reading::Defined(1.0),
        (0, _) => Reading::Defined(0.0),
        _ => {
            let avg_gain = gain_sum / gains as f64;
            let avg_loss = (loss_sum / losses as f64).abs();
            let rs = avg_gain / avg_loss;
            Reading::Defined(1.0 - 1.0 / (1.0 + rs))
        }
    }
}
