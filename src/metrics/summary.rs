//! Summary statistics of a portfolio value series.

use serde::{Deserialize, Serialize};

use super::streaming::StreamingMetrics;
use crate::core::config::StatisticsConfig;
use crate::core::error::{FolioError, Result};
use crate::core::timeseries::TimeSeries;

/// Performance statistics derived from a value series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Mean of daily returns.
    pub average_daily_return: f64,
    /// Sample standard deviation of daily returns.
    pub volatility: f64,
    /// Annualized Sharpe ratio; `None` when volatility is zero.
    pub sharpe_ratio: Option<f64>,
    /// Last value over first value, minus one.
    pub cumulative_return: f64,
    /// First value of the series.
    pub start_value: f64,
    /// Last value of the series.
    pub end_value: f64,
    /// Number of daily returns.
    pub periods: usize,
}

impl SummaryStatistics {
    /// Sharpe ratio, or `UndefinedStatistic` when volatility is zero.
    pub fn sharpe(&self) -> Result<f64> {
        self.sharpe_ratio.ok_or_else(|| {
            FolioError::undefined_statistic(
                "sharpe ratio",
                "volatility of daily returns is zero",
            )
        })
    }
}

/// Compute summary statistics for a value series.
///
/// Needs at least two values. With exactly two there is a single return, so
/// volatility is NaN and the Sharpe ratio is undefined.
pub fn summarize(values: &TimeSeries<f64>, config: &StatisticsConfig) -> Result<SummaryStatistics> {
    let (Some(&start_value), Some(&end_value)) = (values.first(), values.last()) else {
        return Err(FolioError::insufficient_data(2, 0));
    };
    if values.len() < 2 {
        return Err(FolioError::insufficient_data(2, values.len()));
    }
    if start_value == 0.0 {
        return Err(FolioError::undefined_statistic(
            "cumulative return",
            "series starts at zero",
        ));
    }
    let returns = values.pct_change()?;
    let metrics = StreamingMetrics::from_values(returns.values());

    Ok(SummaryStatistics {
        average_daily_return: metrics.mean(),
        volatility: metrics.std_dev(),
        sharpe_ratio: metrics.sharpe_ratio(config.trading_days_per_year, config.risk_free_rate),
        cumulative_return: end_value / start_value - 1.0,
        start_value,
        end_value,
        periods: metrics.count(),
    })
}

/// Annualized Sharpe ratio of a return slice.
///
/// Errors with `UndefinedStatistic` when the returns have zero or undefined
/// volatility.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64, risk_free_rate: f64) -> Result<f64> {
    StreamingMetrics::from_values(returns)
        .sharpe_ratio(periods_per_year, risk_free_rate)
        .ok_or_else(|| {
            FolioError::undefined_statistic(
                "sharpe ratio",
                format!("volatility of {} returns is zero or undefined", returns.len()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> TimeSeries<f64> {
        let dates = NaiveDate::from_ymd_opt(2011, 1, 10)
            .unwrap()
            .iter_days()
            .take(values.len())
            .collect();
        TimeSeries::new(dates, values).unwrap()
    }

    #[test]
    fn test_constant_series() {
        let stats =
            summarize(&series(vec![1000.0; 4]), &StatisticsConfig::default()).unwrap();
        assert_eq!(stats.average_daily_return, 0.0);
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.cumulative_return, 0.0);
        assert!(stats.sharpe_ratio.is_none());
        assert!(matches!(
            stats.sharpe(),
            Err(FolioError::UndefinedStatistic { .. })
        ));
    }

    #[test]
    fn test_growing_series() {
        let stats = summarize(
            &series(vec![2000.0, 2100.0, 2210.0]),
            &StatisticsConfig::default(),
        )
        .unwrap();
        let r1: f64 = 0.05;
        let r2 = 2210.0 / 2100.0 - 1.0;
        let mean = (r1 + r2) / 2.0;
        let std = (((r1 - mean).powi(2) + (r2 - mean).powi(2)) / 1.0_f64).sqrt();
        assert!((stats.average_daily_return - mean).abs() < 1e-12);
        assert!((stats.volatility - std).abs() < 1e-12);
        assert!((stats.sharpe().unwrap() - 252.0_f64.sqrt() * mean / std).abs() < 1e-9);
        assert!((stats.cumulative_return - 0.105).abs() < 1e-12);
        assert_eq!(stats.periods, 2);
        assert_eq!(stats.start_value, 2000.0);
        assert_eq!(stats.end_value, 2210.0);
    }

    #[test]
    fn test_risk_free_rate_and_trading_days() {
        let values = series(vec![100.0, 101.0, 100.5, 102.0]);
        let base = summarize(&values, &StatisticsConfig::default()).unwrap();
        let config = StatisticsConfig {
            risk_free_rate: 0.001,
            trading_days_per_year: 365.0,
        };
        let adjusted = summarize(&values, &config).unwrap();
        let expected =
            365.0_f64.sqrt() * (base.average_daily_return - 0.001) / base.volatility;
        assert!((adjusted.sharpe().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            summarize(&series(vec![1000.0]), &StatisticsConfig::default()),
            Err(FolioError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_two_values_have_undefined_sharpe() {
        let stats =
            summarize(&series(vec![100.0, 110.0]), &StatisticsConfig::default()).unwrap();
        assert!((stats.average_daily_return - 0.1).abs() < 1e-12);
        assert!(stats.volatility.is_nan());
        assert!(stats.sharpe().is_err());
    }

    #[test]
    fn test_sharpe_ratio_slice() {
        assert!(sharpe_ratio(&[0.0, 0.0], 252.0, 0.0).is_err());
        assert!(sharpe_ratio(&[0.01, 0.02, 0.0], 252.0, 0.0).unwrap() > 0.0);
    }
}
