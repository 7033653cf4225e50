//! Integration tests for folioopt summary statistics and reporting.

use chrono::NaiveDate;
use folioopt::core::config::{AnalysisConfig, StatisticsConfig};
use folioopt::core::error::FolioError;
use folioopt::core::timeseries::TimeSeries;
use folioopt::core::types::Order;
use folioopt::data::PriceTable;
use folioopt::metrics::{sharpe_ratio, summarize, FundReport};
use folioopt::portfolio::engine::TradeSimulator;

fn series(values: Vec<f64>) -> TimeSeries<f64> {
    let dates = NaiveDate::from_ymd_opt(2011, 3, 1)
        .unwrap()
        .iter_days()
        .take(values.len())
        .collect();
    TimeSeries::new(dates, values).unwrap()
}

#[test]
fn test_constant_value_series() {
    let stats = summarize(&series(vec![1000.0; 4]), &StatisticsConfig::default()).unwrap();
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
fn test_statistics_of_replayed_fund() {
    let dates: Vec<NaiveDate> = NaiveDate::from_ymd_opt(2011, 1, 10)
        .unwrap()
        .iter_days()
        .take(4)
        .collect();
    let prices = PriceTable::from_columns(
        dates.clone(),
        vec![("AAPL".to_string(), vec![100.0, 110.0, 121.0, 121.0])],
    )
    .unwrap();
    let orders = vec![
        Order::buy(dates[0], "AAPL", 10).unwrap(),
        Order::sell(dates[3], "AAPL", 10).unwrap(),
    ];
    let config = AnalysisConfig {
        starting_capital: 2000.0,
        commission: 0.0,
        ..Default::default()
    };

    let result = TradeSimulator::from_config(&config)
        .replay(&orders, &prices)
        .unwrap();
    let stats = result.statistics(&config.statistics()).unwrap();

    let returns = [0.05, 2210.0 / 2100.0 - 1.0, 0.0];
    let mean = returns.iter().sum::<f64>() / 3.0;
    let std = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0).sqrt();
    assert_eq!(stats.periods, 3);
    assert!((stats.average_daily_return - mean).abs() < 1e-12);
    assert!((stats.volatility - std).abs() < 1e-12);
    assert!((stats.sharpe().unwrap() - 252.0_f64.sqrt() * mean / std).abs() < 1e-9);
    assert!((stats.cumulative_return - 0.105).abs() < 1e-12);
    assert!((stats.end_value - 2210.0).abs() < 1e-10);

    let report = FundReport::new(&stats, config.starting_capital).to_string();
    assert!(report.starts_with("Sharpe Ratio of Fund: "));
    assert!(report.contains("Cumulative Return of Fund: "));
    assert!(report.contains("Initial Portfolio Value: 2000"));
    assert!(report.ends_with("Final Portfolio Value: 2210"));
}

#[test]
fn test_risk_free_rate_from_config() {
    let config = AnalysisConfig::from_toml_str(
        r#"
        risk_free_rate = 0.0001
        trading_days_per_year = 250.0
        "#,
    )
    .unwrap();
    let values = series(vec![100.0, 101.0, 100.5, 102.0, 103.0]);
    let stats = summarize(&values, &config.statistics()).unwrap();
    let expected = 250.0_f64.sqrt() * (stats.average_daily_return - 0.0001) / stats.volatility;
    assert!((stats.sharpe().unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_sharpe_ratio_of_returns() {
    let returns = [0.01, -0.005, 0.007, 0.002];
    let sharpe = sharpe_ratio(&returns, 252.0, 0.0).unwrap();
    assert!(sharpe > 0.0);
    assert!(matches!(
        sharpe_ratio(&[0.01], 252.0, 0.0),
        Err(FolioError::UndefinedStatistic { .. })
    ));
}

#[test]
fn test_zero_start_value_is_undefined() {
    assert!(matches!(
        summarize(&series(vec![0.0, 1.0, 2.0]), &StatisticsConfig::default()),
        Err(FolioError::UndefinedStatistic { .. })
    ));
}
