//! Configuration validation.
//!
//! Validates the `[data]` and `[strategy]` sections before anything runs.

use std::str::FromStr;

use crate::domain::error::SimtraderError;
use crate::domain::indicator::OscillatorKind;
use crate::domain::strategy::crossing::{DEFAULT_FAST, DEFAULT_SLOW};
use crate::domain::strategy::{StrategyName, DEFAULT_AMOUNT, DEFAULT_FEES};
use crate::ports::config_port::ConfigPort;

/// Parse a single value. Absent or blank keys read as `None`; anything
/// present that does not parse is a configuration error.
pub fn read_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SimtraderError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SimtraderError::invalid(section, key, format!("cannot parse '{}'", raw.trim()))),
        _ => Ok(None),
    }
}

pub fn read_or<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, SimtraderError> {
    Ok(read_value(config, section, key)?.unwrap_or(default))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Generate,
    Read,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generate" => Ok(SourceKind::Generate),
            "read" => Ok(SourceKind::Read),
            other => Err(format!("unknown data source '{other}' (expected generate or read)")),
        }
    }
}

pub fn source_kind(config: &dyn ConfigPort) -> Result<SourceKind, SimtraderError> {
    match config.get_string("data", "source") {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map_err(|reason: String| SimtraderError::invalid("data", "source", reason)),
        _ => Ok(SourceKind::Generate),
    }
}

pub fn strategy_name(config: &dyn ConfigPort) -> Result<StrategyName, SimtraderError> {
    match config.get_string("strategy", "kind") {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map_err(|reason: String| SimtraderError::invalid("strategy", "kind", reason)),
        _ => Ok(StrategyName::Random),
    }
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let source = source_kind(config)?;
    validate_seed(config, "data")?;
    let initial_prices = config.get_double_list("data", "initial_prices")?;
    let volatilities = config.get_double_list("data", "volatilities")?;

    match source {
        SourceKind::Generate => {
            validate_days(config)?;
            validate_news_chance(config)?;
            let initial_prices =
                initial_prices.ok_or_else(|| SimtraderError::missing("data", "initial_prices"))?;
            let volatilities =
                volatilities.ok_or_else(|| SimtraderError::missing("data", "volatilities"))?;
            validate_positive_list("initial_prices", &initial_prices)?;
            validate_positive_list("volatilities", &volatilities)?;
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
        }
        SourceKind::Read => {
            match config.get_string("data", "path") {
                Some(p) if !p.trim().is_empty() => {}
                _ => return Err(SimtraderError::missing("data", "path")),
            }
            if let Some(prices) = &initial_prices {
                validate_positive_list("initial_prices", prices)?;
            }
        }
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    validate_strategy_for(config, strategy_name(config)?)
}

/// Validate the `[strategy]` section for a given policy, ignoring its `kind` key.
pub fn validate_strategy_for(
    config: &dyn ConfigPort,
    name: StrategyName,
) -> Result<(), SimtraderError> {
    validate_amount_and_fees(config)?;
    validate_seed(config, "strategy")?;

    match name {
        StrategyName::Random => validate_period(config),
        StrategyName::CrossingAverages => validate_crossing(config),
        StrategyName::Momentum => validate_momentum(config),
    }
}

fn validate_seed(config: &dyn ConfigPort, section: &str) -> Result<(), SimtraderError> {
    read_value::<u64>(config, section, "seed").map(|_| ())
}

fn validate_days(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let days = read_or::<usize>(config, "data", "days", 1)?;
    if days == 0 {
        return Err(SimtraderError::invalid("data", "days", "days must be at least 1"));
    }
    Ok(())
}

fn validate_news_chance(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if let Some(chance) = read_value::<f64>(config, "data", "news_chance")? {
        if !(0.0..=100.0).contains(&chance) {
            return Err(SimtraderError::invalid(
                "data",
                "news_chance",
                "news_chance must be a percentage between 0 and 100",
            ));
        }
    }
    Ok(())
}

fn validate_positive_list(key: &str, values: &[f64]) -> Result<(), SimtraderError> {
    if values.is_empty() {
        return Err(SimtraderError::invalid("data", key, "at least one value is required"));
    }
    if let Some(v) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(SimtraderError::invalid(
            "data",
            key,
            format!("{v} is not a positive number"),
        ));
    }
    Ok(())
}

fn validate_amount_and_fees(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let amount = read_or::<f64>(config, "strategy", "amount", DEFAULT_AMOUNT)?;
    if !(amount.is_finite() && amount > 0.0) {
        return Err(SimtraderError::invalid(
            "strategy",
            "amount",
            "amount must be positive",
        ));
    }
    let fees = read_or::<f64>(config, "strategy", "fees", DEFAULT_FEES)?;
    if !(fees.is_finite() && fees >= 0.0) {
        return Err(SimtraderError::invalid(
            "strategy",
            "fees",
            "fees must be non-negative",
        ));
    }
    if amount < fees {
        return Err(SimtraderError::invalid(
            "strategy",
            "amount",
            format!("amount {amount} does not cover fees {fees}"),
        ));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if read_or::<usize>(config, "strategy", "period", 1)? == 0 {
        return Err(SimtraderError::invalid(
            "strategy",
            "period",
            "period must be at least 1",
        ));
    }
    Ok(())
}

fn validate_crossing(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let fast = read_or::<usize>(config, "strategy", "fast", DEFAULT_FAST)?;
    let slow = read_or::<usize>(config, "strategy", "slow", DEFAULT_SLOW)?;
    if fast == 0 {
        return Err(SimtraderError::invalid("strategy", "fast", "fast must be at least 1"));
    }
    if fast >= slow {
        return Err(SimtraderError::invalid(
            "strategy",
            "fast",
            format!("fast ({fast}) must be shorter than slow ({slow})"),
        ));
    }
    Ok(())
}

fn validate_momentum(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if let Some(raw) = config.get_string("strategy", "oscillator") {
        if !raw.trim().is_empty() {
            raw.parse::<OscillatorKind>()
                .map_err(|reason| SimtraderError::invalid("strategy", "oscillator", reason))?;
        }
    }
    if read_or::<usize>(config, "strategy", "window", 2)? < 2 {
        return Err(SimtraderError::invalid(
            "strategy",
            "window",
            "window must be at least 2",
        ));
    }
    for key in ["overbought", "oversold"] {
        if let Some(threshold) = read_value::<f64>(config, "strategy", key)? {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(SimtraderError::invalid(
                    "strategy",
                    key,
                    format!("{key} must be between 0 and 1"),
                ));
            }
        }
    }
    read_value::<usize>(config, "strategy", "cool_off_period")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_generate_config_passes() {
        let config = make_config(
            r#"
[data]
source = generate
days = 365
initial_prices = 10, 50
volatilities = 0.5, 2
news_chance = 1
seed = 42
"#,
        );
        assert!(validate_data_config(&config).is_ok());
    }

    #[test]
    fn generate_without_volatilities_fails() {
        let config = make_config("[data]\ninitial_prices = 10, 50\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigMissing { key, .. } if key == "volatilities"));
    }

    #[test]
    fn generate_without_initial_prices_fails() {
        let config = make_config("[data]\nvolatilities = 1\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigMissing { key, .. } if key == "initial_prices"));
    }

    #[test]
    fn generate_list_length_mismatch_fails() {
        let config = make_config("[data]\ninitial_prices = 10, 50\nvolatilities = 1\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "volatilities"));
    }

    #[test]
    fn non_positive_volatility_fails() {
        let config = make_config("[data]\ninitial_prices = 10\nvolatilities = 0\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "volatilities"));
    }

    #[test]
    fn zero_days_fails() {
        let config = make_config("[data]\ndays = 0\ninitial_prices = 10\nvolatilities = 1\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "days"));
    }

    #[test]
    fn news_chance_out_of_range_fails() {
        let config =
            make_config("[data]\nnews_chance = 150\ninitial_prices = 10\nvolatilities = 1\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "news_chance"));
    }

    #[test]
    fn read_source_requires_path() {
        let config = make_config("[data]\nsource = read\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigMissing { key, .. } if key == "path"));

        let config = make_config("[data]\nsource = read\npath = prices.txt\nvolatilities = 2\n");
        assert!(validate_data_config(&config).is_ok());
    }

    #[test]
    fn unknown_source_fails() {
        let config = make_config("[data]\nsource = database\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "source"));
    }

    #[test]
    fn non_numeric_seed_fails() {
        let config =
            make_config("[data]\nseed = abc\ninitial_prices = 10\nvolatilities = 1\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "seed"));
    }

    #[test]
    fn default_strategy_config_passes() {
        let config = make_config("[strategy]\n");
        assert!(validate_strategy_config(&config).is_ok());
        assert_eq!(strategy_name(&config).unwrap(), StrategyName::Random);
    }

    #[test]
    fn validate_for_checks_the_given_policy() {
        let config = make_config("[strategy]\nkind = random\nfast = 9\nslow = 3\n");
        assert!(validate_strategy_config(&config).is_ok());
        assert!(validate_strategy_for(&config, StrategyName::CrossingAverages).is_err());
    }

    #[test]
    fn unknown_strategy_kind_fails() {
        let config = make_config("[strategy]\nkind = martingale\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn amount_below_fees_fails() {
        let config = make_config("[strategy]\namount = 10\nfees = 20\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "amount"));
    }

    #[test]
    fn negative_fees_fail() {
        let config = make_config("[strategy]\nfees = -1\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "fees"));
    }

    #[test]
    fn random_zero_period_fails() {
        let config = make_config("[strategy]\nkind = random\nperiod = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn crossing_fast_not_below_slow_fails() {
        let config = make_config("[strategy]\nkind = crossing_averages\nfast = 200\nslow = 50\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "fast"));
    }

    #[test]
    fn momentum_checks_oscillator_and_thresholds() {
        let config = make_config("[strategy]\nkind = momentum\noscillator = macd\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "oscillator"));

        let config = make_config("[strategy]\nkind = momentum\noverbought = 1.2\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "overbought"));

        let config = make_config("[strategy]\nkind = momentum\nwindow = 1\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, SimtraderError::ConfigInvalid { key, .. } if key == "window"));

        let config = make_config(
            "[strategy]\nkind = momentum\noscillator = rsi\nwindow = 14\noverbought = 0.7\noversold = 0.3\ncool_off_period = 5\n",
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn read_value_distinguishes_absent_from_malformed() {
        let config = make_config("[strategy]\nperiod = 7\nfast = x\nslow =\n");
        assert_eq!(read_value::<usize>(&config, "strategy", "period").unwrap(), Some(7));
        assert_eq!(read_value::<usize>(&config, "strategy", "slow").unwrap(), None);
        assert_eq!(read_value::<usize>(&config, "strategy", "missing").unwrap(), None);
        assert!(read_value::<usize>(&config, "strategy", "fast").is_err());
        assert_eq!(read_or(&config, "strategy", "missing", 3usize).unwrap(), 3);
    }
}
