//! Random news shocks feeding the price generator.
//!
//! Each simulated day the model may emit an event: a drift of random size
//! applied for a few consecutive days. Events overlap freely; the generator
//! sums their drifts.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::error::SimtraderError;

pub const DEFAULT_NEWS_CHANCE_PCT: f64 = 1.0;

/// Standard deviation of the event magnitude, in units of volatility.
const MAGNITUDE_SD: f64 = 2.0;
const MIN_DURATION: usize = 3;
const MAX_DURATION_EXCLUSIVE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewsEvent {
    pub drift: f64,
    pub duration: usize,
}

impl NewsEvent {
    pub fn none() -> Self {
        NewsEvent {
            drift: 0.0,
            duration: 1,
        }
    }

    pub fn is_none(&self) -> bool {
        self.drift == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct NewsEventModel {
    chance: f64,
    volatility: f64,
    magnitude: Normal<f64>,
}

impl NewsEventModel {
    /// `chance_pct` is the per-day probability of an event, in percent.
    pub fn new(chance_pct: f64, volatility: f64) -> Result<Self, SimtraderError> {
        if !(0.0..=100.0).contains(&chance_pct) {
            return Err(SimtraderError::invalid(
                "data",
                "news_chance",
                "news_chance must be between 0 and 100",
            ));
        }
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(SimtraderError::invalid(
                "data",
                "volatilities",
                "volatility must be positive",
            ));
        }
        let magnitude = Normal::new(0.0, MAGNITUDE_SD)
            .map_err(|e| SimtraderError::invalid("data", "volatilities", e.to_string()))?;
        Ok(NewsEventModel {
            chance: chance_pct / 100.0,
            volatility,
            magnitude,
        })
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> NewsEvent {
        if !rng.gen_bool(self.chance) {
            return NewsEvent::none();
        }
        let drift = self.magnitude.sample(rng) * self.volatility;
        let duration = rng.gen_range(MIN_DURATION..MAX_DURATION_EXCLUSIVE);
        NewsEvent { drift, duration }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_chance_never_emits() {
        let model = NewsEventModel::new(0.0, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(model.draw(&mut rng), NewsEvent::none());
        }
    }

    #[test]
    fn certain_chance_emits_bounded_durations() {
        let model = NewsEventModel::new(100.0, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let event = model.draw(&mut rng);
            assert!((MIN_DURATION..MAX_DURATION_EXCLUSIVE).contains(&event.duration));
            assert!(event.drift.is_finite());
        }
    }

    #[test]
    fn same_seed_same_events() {
        let model = NewsEventModel::new(50.0, 1.5).unwrap();
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(model.draw(&mut a), model.draw(&mut b));
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(NewsEventModel::new(101.0, 1.0).is_err());
        assert!(NewsEventModel::new(-1.0, 1.0).is_err());
        assert!(NewsEventModel::new(1.0, 0.0).is_err());
        assert!(NewsEventModel::new(1.0, f64::NAN).is_err());
    }
}
