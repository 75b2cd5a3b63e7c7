//! Simple and weighted moving averages.
//!
//! MA(n)[i] = mean(P[i-n+1..=i]); with weights w (most recent last),
//! MA(n)[i] = sum(w[j] * P[i-n+1+j]) / sum(w).
//! Index 0 is day n-1. The series ends at the first delisted day.

use crate::domain::indicator::{IndicatorError, IndicatorSeries, IndicatorType, Reading};
use crate::domain::price::PricePath;

pub fn moving_average(
    path: &PricePath,
    period: usize,
    weights: Option<&[f64]>,
) -> Result<IndicatorSeries<f64>, IndicatorError> {
    let values = moving_average_values(path.listed(), period, weights)?;
    let indicator_type = match weights {
        Some(_) => IndicatorType::Wma(period),
        None => IndicatorType::Sma(period),
    };
    Ok(IndicatorSeries {
        indicator_type,
        first_day: period.saturating_sub(1),
        values,
    })
}

/// Moving average over any real sequence, stopping at the first NaN.
pub fn moving_average_values(
    values: &[f64],
    period: usize,
    weights: Option<&[f64]>,
) -> Result<Vec<f64>, IndicatorError> {
    let weight_sum = match weights {
        Some(w) => {
            if w.len() != period {
                return Err(IndicatorError::WeightLength {
                    expected: period,
                    got: w.len(),
                });
            }
            let sum: f64 = w.iter().sum();
            if sum == 0.0 {
                return Err(IndicatorError::ZeroWeightSum);
            }
            sum
        }
        None => period as f64,
    };

    if period == 0 {
        return Ok(Vec::new());
    }

    let end = values.iter().position(|v| v.is_nan()).unwrap_or(values.len());
    let averages = values[..end]
        .windows(period)
        .map(|window| match weights {
            Some(w) => window.iter().zip(w).map(|(p, wt)| p * wt).sum::<f64>() / weight_sum,
            None => window.iter().sum::<f64>() / weight_sum,
        })
        .collect();
    Ok(averages)
}

/// Moving average of an oscillator series. A window holding an undefined
/// reading is itself undefined.
pub fn smooth_readings(series: &IndicatorSeries<Reading>, period: usize) -> IndicatorSeries<Reading> {
    let values = if period == 0 {
        Vec::new()
    } else {
        series
            .values
            .windows(period)
            .map(|window| {
                window
                    .iter()
                    .map(|r| r.value())
                    .sum::<Option<f64>>()
                    .map_or(Reading::Undefined, |sum| Reading::Defined(sum / period as f64))
            })
            .collect()
    };

    IndicatorSeries {
        indicator_type: IndicatorType::Smoothed(Box::new(series.indicator_type.clone()), period),
        first_day: series.first_day + period.saturating_sub(1),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_basic() {
        let path = PricePath::fully_listed(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = moving_average(&path, 3, None).unwrap();
        assert_eq!(series.indicator_type, IndicatorType::Sma(3));
        assert_eq!(series.first_day, 2);
        assert_eq!(series.values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn sma_length_without_failure() {
        let path = PricePath::fully_listed((1..=30).map(f64::from).collect());
        let series = moving_average(&path, 7, None).unwrap();
        assert_eq!(series.len(), 30 - 7 + 1);
    }

    #[test]
    fn sma_truncates_at_failure() {
        // fails on day 6 of 10
        let path = PricePath::new(vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0], 10);
        let series = moving_average(&path, 3, None).unwrap();
        assert_eq!(series.len(), 6 - 3 + 1);
        assert_eq!(series.last_day(), Some(5));
        assert_eq!(series.at_day(6), None);
    }

    #[test]
    fn sma_failure_before_first_window_is_empty() {
        let path = PricePath::new(vec![10.0, 11.0], 10);
        let series = moving_average(&path, 5, None).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn wma_weights_most_recent_last() {
        let path = PricePath::fully_listed(vec![10.0, 20.0, 30.0, 40.0]);
        let series = moving_average(&path, 3, Some(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(series.indicator_type, IndicatorType::Wma(3));
        assert_relative_eq!(series.values[0], (10.0 + 40.0 + 90.0) / 6.0);
        assert_relative_eq!(series.values[1], (20.0 + 60.0 + 120.0) / 6.0);
    }

    #[test]
    fn wma_rejects_wrong_weight_count() {
        let path = PricePath::fully_listed(vec![1.0, 2.0, 3.0]);
        let err = moving_average(&path, 3, Some(&[1.0, 2.0])).unwrap_err();
        assert_eq!(err, IndicatorError::WeightLength { expected: 3, got: 2 });
    }

    #[test]
    fn wma_rejects_zero_weight_sum() {
        let path = PricePath::fully_listed(vec![1.0, 2.0]);
        let err = moving_average(&path, 2, Some(&[1.0, -1.0])).unwrap_err();
        assert_eq!(err, IndicatorError::ZeroWeightSum);
    }

    #[test]
    fn period_zero_is_empty() {
        let path = PricePath::fully_listed(vec![1.0, 2.0]);
        assert!(moving_average(&path, 0, None).unwrap().is_empty());
    }

    #[test]
    fn values_stop_at_nan() {
        let values = [1.0, 2.0, 3.0, f64::NAN, 5.0, 6.0];
        assert_eq!(moving_average_values(&values, 2, None).unwrap(), vec![1.5, 2.5]);
    }

    #[test]
    fn smoothing_propagates_undefined() {
        let osc = IndicatorSeries {
            indicator_type: IndicatorType::Stochastic(7),
            first_day: 6,
            values: vec![
                Reading::Defined(0.3),
                Reading::Defined(0.6),
                Reading::Defined(0.9),
                Reading::Undefined,
                Reading::Defined(0.5),
                Reading::Defined(0.5),
                Reading::Defined(0.2),
            ],
        };
        let smoothed = smooth_readings(&osc, 3);
        assert_eq!(smoothed.first_day, 8);
        assert_eq!(smoothed.len(), 5);
        assert_relative_eq!(smoothed.values[0].value().unwrap(), 0.6, epsilon = 1e-12);
        assert_eq!(smoothed.values[1], Reading::Undefined);
        assert_eq!(smoothed.values[2], Reading::Undefined);
        assert_eq!(smoothed.values[3], Reading::Undefined);
        assert_relative_eq!(smoothed.values[4].value().unwrap(), 0.4, epsilon = 1e-12);
    }
}
