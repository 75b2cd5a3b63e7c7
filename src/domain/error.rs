//! Domain error types.

use crate::domain::indicator::IndicatorError;

/// Why a single buy or sell could not be executed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeError {
    #[error("stock {stock} is delisted on day {day}")]
    Delisted { stock: usize, day: usize },

    #[error("capital {capital:.2} does not cover fees {fees:.2}")]
    InsufficientCapital { capital: f64, fees: f64 },

    #[error("stock {stock} out of range (matrix has {stocks} stocks)")]
    UnknownStock { stock: usize, stocks: usize },

    #[error("day {day} out of range (horizon is {days} days)")]
    UnknownDay { day: usize, days: usize },

    #[error("{count:e} shares at price {price:e} exceed the largest tradable position")]
    TooManyShares { count: f64, price: f64 },

    #[error("position in stock {stock} would exceed the largest tradable position")]
    PositionOverflow { stock: usize },
}

/// Top-level error type for simtrader.
#[derive(Debug, thiserror::Error)]
pub enum SimtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid price matrix shape: {reason}")]
    Shape { reason: String },

    #[error("price data error: {reason}")]
    DataFormat { reason: String },

    #[error("ledger error: {reason}")]
    Ledger { reason: String },

    #[error("ledger line {line}: {reason}")]
    LedgerParse { line: usize, reason: String },

    #[error(transparent)]
    Trade(#[from] TradeError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimtraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SimtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        SimtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&SimtraderError> for std::process::ExitCode {
    fn from(err: &SimtraderError) -> Self {
        let code: u8 = match err {
            SimtraderError::Io(_) => 1,
            SimtraderError::ConfigParse { .. }
            | SimtraderError::ConfigMissing { .. }
            | SimtraderError::ConfigInvalid { .. }
            | SimtraderError::Shape { .. }
            | SimtraderError::Indicator(_) => 2,
            SimtraderError::DataFormat { .. } => 3,
            SimtraderError::Ledger { .. } | SimtraderError::LedgerParse { .. } => 4,
            SimtraderError::Trade(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_display() {
        let err = SimtraderError::invalid("strategy", "period", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] period: must be positive"
        );
    }

    #[test]
    fn trade_error_converts() {
        let err: SimtraderError = TradeError::Delisted { stock: 3, day: 40 }.into();
        assert_eq!(err.to_string(), "stock 3 is delisted on day 40");
    }
}
