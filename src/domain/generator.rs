//! Synthetic price paths: a gaussian random walk with overlapping news drift.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::domain::error::SimtraderError;
use crate::domain::news::{NewsEventModel, DEFAULT_NEWS_CHANCE_PCT};
use crate::domain::price::{PriceMatrix, PricePath};

/// Five years of daily prices.
pub const DEFAULT_DAYS: usize = 1825;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    pub days: usize,
    pub initial_price: f64,
    pub volatility: f64,
    pub news_chance_pct: f64,
}

impl GeneratorParams {
    pub fn new(days: usize, initial_price: f64, volatility: f64) -> Self {
        GeneratorParams {
            days,
            initial_price,
            volatility,
            news_chance_pct: DEFAULT_NEWS_CHANCE_PCT,
        }
    }

    fn validate(&self) -> Result<(), SimtraderError> {
        if self.days == 0 {
            return Err(SimtraderError::invalid("data", "days", "days must be at least 1"));
        }
        if !(self.initial_price.is_finite() && self.initial_price > 0.0) {
            return Err(SimtraderError::invalid(
                "data",
                "initial_prices",
                "initial price must be positive",
            ));
        }
        if !(self.volatility.is_finite() && self.volatility > 0.0) {
            return Err(SimtraderError::invalid(
                "data",
                "volatilities",
                "volatility must be positive",
            ));
        }
        Ok(())
    }
}

/// Generate one stock's daily prices.
///
/// Each day after day 0 moves by a N(0, volatility) increment plus the sum of
/// the drifts of all news events still active on that day. Events running past
/// the horizon are cut off. A price at or below zero fails the company and
/// every later day is delisted.
pub fn generate_price_path<R: Rng>(
    params: &GeneratorParams,
    rng: &mut R,
) -> Result<PricePath, SimtraderError> {
    params.validate()?;

    let days = params.days;
    let increment = Normal::new(0.0, params.volatility)
        .map_err(|e| SimtraderError::invalid("data", "volatilities", e.to_string()))?;
    let news = NewsEventModel::new(params.news_chance_pct, params.volatility)?;

    let mut listed = Vec::with_capacity(days);
    listed.push(params.initial_price);
    let mut total_drift = vec![0.0; days];

    for day in 1..days {
        let step = increment.sample(rng);
        let event = news.draw(rng);

        let end = (day + event.duration).min(days);
        for drift in &mut total_drift[day..end] {
            *drift += event.drift;
        }

        let price = listed[day - 1] + step + total_drift[day];
        if price <= 0.0 {
            debug!(day, "company failed");
            break;
        }
        listed.push(price);
    }

    Ok(PricePath::new(listed, days))
}

/// Generate one path per stock from parallel lists of initial prices and volatilities.
pub fn generate_price_matrix<R: Rng>(
    days: usize,
    initial_prices: Option<&[f64]>,
    volatilities: Option<&[f64]>,
    news_chance_pct: f64,
    rng: &mut R,
) -> Result<PriceMatrix, SimtraderError> {
    let (initial_prices, volatilities) = match (initial_prices, volatilities) {
        (Some(p), Some(v)) => (p, v),
        (Some(_), None) => return Err(SimtraderError::missing("data", "volatilities")),
        (None, _) => return Err(SimtraderError::missing("data", "initial_prices")),
    };
    if initial_prices.is_empty() {
        return Err(SimtraderError::invalid(
            "data",
            "initial_prices",
            "at least one stock is required",
        ));
    }
    if initial_prices.len() != volatilities.len() {
        return Err(SimtraderError::invalid(
            "data",
            "volatilities",
            format!(
                "{} volatilities for {} initial prices",
                volatilities.len(),
                initial_prices.len()
            ),
        ));
    }

    let paths = initial_prices
        .iter()
        .zip(volatilities)
        .map(|(&initial_price, &volatility)| {
            let params = GeneratorParams {
                days,
                initial_price,
                volatility,
                news_chance_pct,
            };
            generate_price_path(&params, rng)
        })
        .collect::<Result<Vec<_>, _>>()?;

    PriceMatrix::from_paths(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::Quote;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn day_zero_is_initial_price() {
        let mut rng = StdRng::seed_from_u64(1);
        let path = generate_price_path(&GeneratorParams::new(50, 123.0, 1.0), &mut rng).unwrap();
        assert_eq!(path.days(), 50);
        assert_eq!(path.price(0), Quote::Listed(123.0));
    }

    #[test]
    fn single_day_horizon() {
        let mut rng = StdRng::seed_from_u64(1);
        let path = generate_price_path(&GeneratorParams::new(1, 10.0, 1.0), &mut rng).unwrap();
        assert_eq!(path.listed(), &[10.0]);
        assert_eq!(path.failure_day(), None);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let params = GeneratorParams::new(500, 100.0, 3.0);
        let a = generate_price_path(&params, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate_price_path(&params, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn high_volatility_low_price_fails_permanently() {
        let params = GeneratorParams::new(1000, 1.0, 5.0);
        let mut rng = StdRng::seed_from_u64(5);
        let path = generate_price_path(&params, &mut rng).unwrap();
        let failure = path.failure_day().expect("path should fail");
        for day in failure..path.days() {
            assert!(path.price(day).is_delisted());
        }
        assert!(path.listed().iter().all(|&p| p > 0.0));
    }

    #[test]
    fn rejects_invalid_params() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_price_path(&GeneratorParams::new(0, 10.0, 1.0), &mut rng).is_err());
        assert!(generate_price_path(&GeneratorParams::new(10, 0.0, 1.0), &mut rng).is_err());
        assert!(generate_price_path(&GeneratorParams::new(10, 10.0, -1.0), &mut rng).is_err());
    }

    #[test]
    fn matrix_requires_both_parameter_lists() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_price_matrix(10, Some(&[10.0]), None, 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigMissing { key, .. } if key == "volatilities"));
        let err = generate_price_matrix(10, None, Some(&[1.0]), 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigMissing { key, .. } if key == "initial_prices"));
        let err = generate_price_matrix(10, None, None, 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigMissing { .. }));
    }

    #[test]
    fn matrix_rejects_length_mismatch() {
        let mut rng = StdRng::seed_from_u64(1);
        let err =
            generate_price_matrix(10, Some(&[10.0, 20.0]), Some(&[1.0]), 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { .. }));
    }

    #[test]
    fn matrix_has_one_column_per_stock() {
        let mut rng = StdRng::seed_from_u64(8);
        let matrix =
            generate_price_matrix(30, Some(&[10.0, 50.0, 90.0]), Some(&[0.5, 1.0, 2.0]), 1.0, &mut rng)
                .unwrap();
        assert_eq!(matrix.stocks(), 3);
        assert_eq!(matrix.days(), 30);
        assert_eq!(matrix.price(0, 1), Quote::Listed(50.0));
    }
}
