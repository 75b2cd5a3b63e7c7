//! Daily price paths and the days × stocks price matrix.
//!
//! A company that fails stays failed: a [`PricePath`] keeps only the run of
//! listed prices before the first failure day, so every later day reads as
//! [`Quote::Delisted`].

use crate::domain::error::SimtraderError;

/// The price of one stock on one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quote {
    Listed(f64),
    Delisted,
}

impl Quote {
    pub fn listed(self) -> Option<f64> {
        match self {
            Quote::Listed(price) => Some(price),
            Quote::Delisted => None,
        }
    }

    pub fn is_delisted(self) -> bool {
        matches!(self, Quote::Delisted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricePath {
    listed: Vec<f64>,
    days: usize,
}

impl PricePath {
    /// Build a path from its listed prices; days past `listed.len()` are delisted.
    pub fn new(listed: Vec<f64>, days: usize) -> Self {
        let mut listed = listed;
        listed.truncate(days);
        PricePath { listed, days }
    }

    /// A path that never fails.
    pub fn fully_listed(prices: Vec<f64>) -> Self {
        let days = prices.len();
        PricePath::new(prices, days)
    }

    /// Interpret raw values, where NaN or a non-positive price marks failure.
    pub fn from_raw(raw: &[f64]) -> Self {
        let listed: Vec<f64> = raw
            .iter()
            .copied()
            .take_while(|p| p.is_finite() && *p > 0.0)
            .collect();
        PricePath::new(listed, raw.len())
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn listed(&self) -> &[f64] {
        &self.listed
    }

    /// First delisted day, if the company fails within the horizon.
    pub fn failure_day(&self) -> Option<usize> {
        (self.listed.len() < self.days).then_some(self.listed.len())
    }

    pub fn price(&self, day: usize) -> Quote {
        match self.listed.get(day) {
            Some(&price) => Quote::Listed(price),
            None => Quote::Delisted,
        }
    }

    /// Raw values with NaN on delisted days.
    pub fn to_raw(&self) -> Vec<f64> {
        (0..self.days)
            .map(|day| self.price(day).listed().unwrap_or(f64::NAN))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    paths: Vec<PricePath>,
    days: usize,
}

impl PriceMatrix {
    pub fn from_paths(paths: Vec<PricePath>) -> Result<Self, SimtraderError> {
        let days = match paths.first() {
            Some(path) => path.days(),
            None => {
                return Err(SimtraderError::Shape {
                    reason: "price matrix has no stocks".into(),
                });
            }
        };
        if days == 0 {
            return Err(SimtraderError::Shape {
                reason: "price matrix has no days".into(),
            });
        }
        if let Some((stock, path)) = paths.iter().enumerate().find(|(_, p)| p.days() != days) {
            return Err(SimtraderError::Shape {
                reason: format!(
                    "stock {} has {} days, expected {}",
                    stock,
                    path.days(),
                    days
                ),
            });
        }
        Ok(PriceMatrix { paths, days })
    }

    /// Single-column input becomes a one-stock matrix.
    pub fn single(path: PricePath) -> Result<Self, SimtraderError> {
        PriceMatrix::from_paths(vec![path])
    }

    /// Build from rows of days, one column per stock.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SimtraderError> {
        let stocks = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => {
                return Err(SimtraderError::Shape {
                    reason: "price matrix is empty".into(),
                });
            }
        };
        if let Some((day, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != stocks) {
            return Err(SimtraderError::Shape {
                reason: format!("row {} has {} columns, expected {}", day, row.len(), stocks),
            });
        }

        let paths = (0..stocks)
            .map(|stock| {
                let column: Vec<f64> = rows.iter().map(|row| row[stock]).collect();
                PricePath::from_raw(&column)
            })
            .collect();
        PriceMatrix::from_paths(paths)
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn stocks(&self) -> usize {
        self.paths.len()
    }

    pub fn last_day(&self) -> usize {
        self.days - 1
    }

    pub fn path(&self, stock: usize) -> Option<&PricePath> {
        self.paths.get(stock)
    }

    pub fn paths(&self) -> &[PricePath] {
        &self.paths
    }

    /// Quote for a stock on a day; out-of-range lookups read as delisted.
    pub fn price(&self, day: usize, stock: usize) -> Quote {
        self.paths
            .get(stock)
            .map(|path| path.price(day))
            .unwrap_or(Quote::Delisted)
    }

    /// Rows of raw values (days × stocks) with NaN on delisted days.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let columns: Vec<Vec<f64>> = self.paths.iter().map(PricePath::to_raw).collect();
        (0..self.days)
            .map(|day| columns.iter().map(|col| col[day]).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_truncates_at_first_nan() {
        let path = PricePath::from_raw(&[10.0, 11.0, f64::NAN, 12.0, 13.0]);
        assert_eq!(path.days(), 5);
        assert_eq!(path.listed(), &[10.0, 11.0]);
        assert_eq!(path.failure_day(), Some(2));
        assert_eq!(path.price(1), Quote::Listed(11.0));
        assert_eq!(path.price(3), Quote::Delisted);
    }

    #[test]
    fn from_raw_treats_non_positive_as_failure() {
        let path = PricePath::from_raw(&[5.0, 0.0, 4.0]);
        assert_eq!(path.failure_day(), Some(1));
        assert!(path.price(2).is_delisted());
    }

    #[test]
    fn fully_listed_has_no_failure() {
        let path = PricePath::fully_listed(vec![1.0, 2.0, 3.0]);
        assert_eq!(path.failure_day(), None);
        assert_eq!(path.price(3), Quote::Delisted);
    }

    #[test]
    fn to_raw_marks_delisted_with_nan() {
        let raw = PricePath::new(vec![3.0, 4.0], 4).to_raw();
        assert_eq!(raw[..2], [3.0, 4.0]);
        assert!(raw[2].is_nan() && raw[3].is_nan());
    }

    #[test]
    fn matrix_rejects_mismatched_days() {
        let err = PriceMatrix::from_paths(vec![
            PricePath::fully_listed(vec![1.0, 2.0]),
            PricePath::fully_listed(vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, SimtraderError::Shape { .. }));
    }

    #[test]
    fn matrix_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            PriceMatrix::from_rows(&rows),
            Err(SimtraderError::Shape { .. })
        ));
    }

    #[test]
    fn matrix_rejects_empty() {
        assert!(PriceMatrix::from_rows(&[]).is_err());
        assert!(PriceMatrix::from_paths(vec![]).is_err());
    }

    #[test]
    fn single_column_is_one_stock() {
        let matrix = PriceMatrix::single(PricePath::fully_listed(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(matrix.stocks(), 1);
        assert_eq!(matrix.days(), 3);
        assert_eq!(matrix.price(2, 0), Quote::Listed(3.0));
    }

    #[test]
    fn rows_round_trip_through_columns() {
        let rows = vec![vec![10.0, 20.0], vec![11.0, f64::NAN], vec![12.0, 22.0]];
        let matrix = PriceMatrix::from_rows(&rows).unwrap();
        assert_eq!(matrix.price(2, 0), Quote::Listed(12.0));
        // failure is permanent even if the raw data lists a later price
        assert_eq!(matrix.price(2, 1), Quote::Delisted);
        let back = matrix.to_rows();
        assert_eq!(back[2][0], 12.0);
        assert!(back[2][1].is_nan());
    }

    #[test]
    fn out_of_range_stock_reads_delisted() {
        let matrix = PriceMatrix::single(PricePath::fully_listed(vec![1.0])).unwrap();
        assert_eq!(matrix.price(0, 5), Quote::Delisted);
    }
}
