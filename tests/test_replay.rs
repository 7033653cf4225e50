//! Integration tests for folioopt trade replay.

use chrono::NaiveDate;
use folioopt::core::config::AnalysisConfig;
use folioopt::core::error::FolioError;
use folioopt::core::types::{orders_from_records, Order, OrderRecord};
use folioopt::data::{InMemoryPriceSource, PriceTable};
use folioopt::execution::FeeModel;
use folioopt::portfolio::engine::{simulate, TradeSimulator};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 1, d).unwrap()
}

fn dates(n: usize) -> Vec<NaiveDate> {
    day(10).iter_days().take(n).collect()
}

fn sample_prices() -> PriceTable {
    PriceTable::from_columns(
        dates(5),
        vec![
            ("AAPL".to_string(), vec![100.0, 110.0, 121.0, 118.0, 125.0]),
            ("IBM".to_string(), vec![146.0, 147.5, 149.0, 150.0, 148.0]),
            ("XOM".to_string(), vec![75.0, 76.0, 74.5, 77.0, 78.0]),
        ],
    )
    .unwrap()
}

fn record(date: &str, symbol: &str, order: &str, shares: i64) -> OrderRecord {
    OrderRecord {
        date: date.to_string(),
        symbol: symbol.to_string(),
        order: order.to_string(),
        shares,
    }
}

#[test]
fn test_single_buy_scenario() {
    let prices = PriceTable::from_columns(
        dates(3),
        vec![("AAPL".to_string(), vec![100.0, 110.0, 121.0])],
    )
    .unwrap();
    let orders = vec![
        Order::buy(day(10), "AAPL", 10).unwrap(),
        // One-share round trip so the window reaches the third day.
        Order::buy(day(12), "AAPL", 1).unwrap(),
        Order::sell(day(12), "AAPL", 1).unwrap(),
    ];
    let config = AnalysisConfig {
        starting_capital: 2000.0,
        commission: 0.0,
        ..Default::default()
    };

    let result = TradeSimulator::from_config(&config)
        .replay(&orders, &prices)
        .unwrap();
    let values = result.values.values();
    assert_eq!(values.len(), 3);
    assert!((values[0] - 2000.0).abs() < 1e-10);
    assert!((values[1] - 2100.0).abs() < 1e-10);
    assert!((values[2] - 2210.0).abs() < 1e-10);
    assert_eq!(result.total_commission, 0.0);
    assert_eq!(result.holdings.shares_on(day(12), "AAPL"), Some(10));
}

#[test]
fn test_round_trip_costs_two_commissions() {
    let prices = sample_prices();
    let frame = vec![
        Order::buy(day(10), "IBM", 5).unwrap(),
        Order::sell(day(14), "IBM", 5).unwrap(),
    ];
    let mut with_round_trip = frame.clone();
    with_round_trip.push(Order::buy(day(12), "AAPL", 20).unwrap());
    with_round_trip.push(Order::sell(day(12), "AAPL", 20).unwrap());

    let simulator = TradeSimulator::new(100_000.0).with_fee_model(FeeModel::fixed(9.95));
    let base = simulator.replay(&frame, &prices).unwrap();
    let traded = simulator.replay(&with_round_trip, &prices).unwrap();

    assert_eq!(base.values.dates(), traded.values.dates());
    for (i, (b, t)) in base
        .values
        .values()
        .iter()
        .zip(traded.values.values())
        .enumerate()
    {
        let expected_gap = if i >= 2 { 2.0 * 9.95 } else { 0.0 };
        assert!((b - t - expected_gap).abs() < 1e-9);
    }
    assert!((traded.total_commission - 4.0 * 9.95).abs() < 1e-10);
}

#[test]
fn test_replay_is_deterministic() {
    let prices = sample_prices();
    let orders = vec![
        Order::buy(day(10), "AAPL", 10).unwrap(),
        Order::buy(day(11), "XOM", 30).unwrap(),
        Order::sell(day(13), "AAPL", 4).unwrap(),
        Order::sell(day(14), "XOM", 30).unwrap(),
    ];
    let simulator = TradeSimulator::default();
    let first = simulator.replay(&orders, &prices).unwrap();
    let second = simulator.replay(&orders, &prices).unwrap();
    assert_eq!(first.values, second.values);
    assert_eq!(first.holdings, second.holdings);
}

#[test]
fn test_orders_from_unsorted_records() {
    let records = vec![
        record("2011-01-13", "AAPL", "sell", 10),
        record("2011-01-10", "AAPL", "Buy", 10),
        record("2011-01-10", "IBM", "BUY", 2),
    ];
    let orders = orders_from_records(records).unwrap();
    assert_eq!(orders[0].symbol, "AAPL");
    assert_eq!(orders[1].symbol, "IBM");
    assert_eq!(orders[2].date, day(13));

    let result = TradeSimulator::new(10_000.0)
        .with_fee_model(FeeModel::None)
        .replay(&orders, &sample_prices())
        .unwrap();
    assert_eq!(result.values.len(), 4);
    assert_eq!(result.orders_applied, 3);
    assert_eq!(
        result.holdings.final_positions(),
        vec![("IBM".to_string(), 2)]
    );
    // 10000 + 10 * (118 - 100) + 2 * (150 - 146)
    assert!((result.values.values()[3] - 10_188.0).abs() < 1e-10);
}

#[test]
fn test_malformed_records_are_invalid_orders() {
    for bad in [
        record("2011-01-10", "AAPL", "HOLD", 10),
        record("2011-01-10", "AAPL", "BUY", 0),
        record("2011-01-10", "AAPL", "SELL", -3),
        record("10/01/2011", "AAPL", "BUY", 1),
        record("2011-01-10", " ", "BUY", 1),
    ] {
        assert!(matches!(
            orders_from_records(vec![bad]),
            Err(FolioError::InvalidOrder { .. })
        ));
    }
}

#[test]
fn test_order_outside_prices_is_invalid() {
    let orders = vec![
        Order::buy(day(10), "AAPL", 1).unwrap(),
        Order::buy(day(20), "AAPL", 1).unwrap(),
    ];
    assert!(matches!(
        TradeSimulator::default().replay(&orders, &sample_prices()),
        Err(FolioError::InvalidOrder { .. })
    ));
}

#[test]
fn test_short_positions_are_allowed() {
    let orders = vec![
        Order::sell(day(10), "XOM", 10).unwrap(),
        Order::buy(day(12), "XOM", 10).unwrap(),
    ];
    let result = TradeSimulator::new(1000.0)
        .with_fee_model(FeeModel::None)
        .replay(&orders, &sample_prices())
        .unwrap();
    assert_eq!(result.holdings.shares_on(day(11), "XOM"), Some(-10));
    // Sold at 75, bought back at 74.5.
    assert!((result.values.values()[2] - 1005.0).abs() < 1e-10);
}

#[test]
fn test_simulate_aligns_on_benchmark_calendar() {
    // 2011-01-15 and 16 are a weekend; AAPL misses the 18th.
    let spy = vec![
        (day(13), 127.0),
        (day(14), 128.0),
        (day(17), 128.5),
        (day(18), 129.0),
        (day(19), 128.0),
    ];
    let aapl = vec![
        (day(13), 345.0),
        (day(14), 348.0),
        (day(17), 350.0),
        (day(19), 338.0),
    ];
    let source = InMemoryPriceSource::new()
        .with_series("SPY", spy)
        .with_series("AAPL", aapl);
    let orders = vec![
        Order::buy(day(14), "AAPL", 10).unwrap(),
        Order::sell(day(19), "AAPL", 10).unwrap(),
    ];
    let config = AnalysisConfig {
        starting_capital: 10_000.0,
        commission: 0.0,
        ..Default::default()
    };

    let result = simulate(&source, &orders, &config).unwrap();
    assert_eq!(
        result.values.dates(),
        &[day(14), day(17), day(18), day(19)]
    );
    assert_eq!(result.holdings.symbols(), &["AAPL".to_string()]);
    // The 18th is valued at the previous close.
    assert!((result.values.values()[2] - (10_000.0 + 10.0 * (350.0 - 348.0))).abs() < 1e-10);
    assert!((result.values.values()[3] - (10_000.0 - 100.0)).abs() < 1e-10);
}

#[test]
fn test_simulate_requires_benchmark_prices() {
    let source = InMemoryPriceSource::new().with_series("AAPL", vec![(day(13), 345.0)]);
    let orders = vec![Order::buy(day(13), "AAPL", 1).unwrap()];
    assert!(matches!(
        simulate(&source, &orders, &AnalysisConfig::default()),
        Err(FolioError::MissingPriceData { .. })
    ));

    let config = AnalysisConfig {
        benchmark: None,
        ..Default::default()
    };
    let result = simulate(&source, &orders, &config).unwrap();
    assert_eq!(result.values.len(), 1);
}
