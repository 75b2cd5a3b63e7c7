//! Whitespace-separated price table files.
//!
//! Row 0 holds each stock's volatility; every following row is one day of
//! prices, one column per stock. Delisted days are written as `nan`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::SimtraderError;
use crate::domain::price::PriceMatrix;
use crate::domain::selection::HistoricalTable;
use crate::ports::data_port::DataPort;

pub struct MatrixFileAdapter {
    path: PathBuf,
}

impl MatrixFileAdapter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_row(line: &str, line_no: usize) -> Result<Vec<f64>, SimtraderError> {
        line.split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| SimtraderError::DataFormat {
                    reason: format!("line {}: '{}' is not a number", line_no, token),
                })
            })
            .collect()
    }
}

impl DataPort for MatrixFileAdapter {
    fn load_table(&self) -> Result<HistoricalTable, SimtraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SimtraderError::DataFormat {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let rows = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| Self::parse_row(line, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        HistoricalTable::from_raw_rows(rows)
    }
}

/// Render a table: the volatility row, then one row of prices per day.
pub fn format_table(volatilities: &[f64], prices: &PriceMatrix) -> Result<String, SimtraderError> {
    if volatilities.len() != prices.stocks() {
        return Err(SimtraderError::Shape {
            reason: format!(
                "{} volatilities for {} stocks",
                volatilities.len(),
                prices.stocks()
            ),
        });
    }

    let mut out = String::new();
    let mut push_row = |values: &[f64]| {
        let row: Vec<String> = values
            .iter()
            .map(|v| if v.is_nan() { "nan".to_string() } else { v.to_string() })
            .collect();
        // writing to a String cannot fail
        let _ = writeln!(out, "{}", row.join(" "));
    };
    push_row(volatilities);
    for row in prices.to_rows() {
        push_row(&row);
    }
    Ok(out)
}

pub fn write_table<P: AsRef<Path>>(
    path: P,
    volatilities: &[f64],
    prices: &PriceMatrix,
) -> Result<(), SimtraderError> {
    let content = format_table(volatilities, prices)?;
    fs::write(path.as_ref(), content)?;
    Ok(())
}
