//! Order replay engine.
//!
//! Replays dated BUY/SELL orders against closing prices and marks the
//! resulting holdings to market every day.

use tracing::{debug, info};

use super::ledger::{CumulativeHoldings, HoldingsDelta};
use crate::core::config::{AnalysisConfig, StatisticsConfig};
use crate::core::error::{FolioError, Result};
use crate::core::timeseries::TimeSeries;
use crate::core::types::Order;
use crate::data::prices::PriceTable;
use crate::data::source::{load_prices, PriceRequest, PriceSource};
use crate::execution::FeeModel;
use crate::metrics::summary::{summarize, SummaryStatistics};

/// Result of replaying an order list.
#[derive(Debug, Clone)]
pub struct ReplayResult {
    /// Portfolio value at the close of each date in the replay window.
    pub values: TimeSeries<f64>,
    /// Per-date share and cash changes.
    pub deltas: HoldingsDelta,
    /// Shares and cash held at the close of each date.
    pub holdings: CumulativeHoldings,
    /// Commission paid across all orders.
    pub total_commission: f64,
    /// Number of orders applied.
    pub orders_applied: usize,
}

impl ReplayResult {
    /// Summary statistics of the value series.
    pub fn statistics(&self, config: &StatisticsConfig) -> Result<SummaryStatistics> {
        summarize(&self.values, config)
    }
}

/// Replays orders against a price table.
#[derive(Debug, Clone)]
pub struct TradeSimulator {
    /// Cash held on the first date of the replay window.
    pub starting_capital: f64,
    /// Commission model.
    pub fee_model: FeeModel,
}

impl Default for TradeSimulator {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl TradeSimulator {
    /// Create a simulator with the default commission model.
    pub fn new(starting_capital: f64) -> Self {
        Self {
            starting_capital,
            fee_model: FeeModel::default(),
        }
    }

    /// Create a simulator from run configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            starting_capital: config.starting_capital,
            fee_model: config.fee_model(),
        }
    }

    /// Set fee model.
    pub fn with_fee_model(mut self, fee_model: FeeModel) -> Self {
        self.fee_model = fee_model;
        self
    }

    /// Replay `orders` against `prices`.
    ///
    /// # Arguments
    /// * `orders` - Orders in any order; same-date orders apply in input order
    /// * `prices` - Closing prices covering every order's symbol and date
    ///
    /// # Returns
    /// Values and holdings over the window from the first to the last order
    /// date, restricted to the traded symbols.
    pub fn replay(&self, orders: &[Order], prices: &PriceTable) -> Result<ReplayResult> {
        if orders.is_empty() {
            return Err(FolioError::empty_data("order list"));
        }
        if !(self.starting_capital.is_finite() && self.starting_capital > 0.0) {
            return Err(FolioError::invalid_parameter(format!(
                "starting capital must be positive, got {}",
                self.starting_capital
            )));
        }

        let mut sorted = orders.to_vec();
        sorted.sort_by_key(|o| o.date);

        for order in &sorted {
            order.validate()?;
            if !prices.contains_symbol(&order.symbol) {
                return Err(FolioError::invalid_order(format!(
                    "no prices for {} ({} on {})",
                    order.symbol, order.action, order.date
                )));
            }
            if prices.date_index(order.date).is_none() {
                return Err(FolioError::invalid_order(format!(
                    "{} is not a trading date ({} {})",
                    order.date, order.action, order.symbol
                )));
            }
        }

        let symbols = traded_symbols(&sorted);
        let first = sorted[0].date;
        let last = sorted[sorted.len() - 1].date;
        let window = prices.select(&symbols)?.restrict(first, last)?;

        let mut deltas =
            HoldingsDelta::new(window.dates().to_vec(), symbols, self.starting_capital)?;
        let mut total_commission = 0.0;
        for order in &sorted {
            let (Some(row), Some(column)) = (
                window.date_index(order.date),
                window.symbol_index(&order.symbol),
            ) else {
                return Err(FolioError::invalid_order(format!(
                    "{} {} on {} is outside the replay window",
                    order.action, order.symbol, order.date
                )));
            };
            let price = window.closes()[(row, column)];
            let commission = self.fee_model.calculate();
            let cash = order.action.cash_sign() * price * order.shares as f64 - commission;
            deltas.record(row, column, order.signed_shares(), cash);
            total_commission += commission;
            debug!(
                date = %order.date,
                symbol = %order.symbol,
                action = %order.action,
                shares = order.shares,
                price,
                commission,
                "order applied"
            );
        }

        let holdings = deltas.cumulative();
        let values = holdings.value_series(&window)?;
        info!(
            orders = sorted.len(),
            days = values.len(),
            start = %first,
            end = %last,
            total_commission,
            "replay complete"
        );

        Ok(ReplayResult {
            values,
            deltas,
            holdings,
            total_commission,
            orders_applied: sorted.len(),
        })
    }
}

/// Symbols in order of first appearance.
fn traded_symbols(orders: &[Order]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for order in orders {
        if !symbols.contains(&order.symbol) {
            symbols.push(order.symbol.clone());
        }
    }
    symbols
}

/// Load prices for `orders` from `source` and replay them.
///
/// The configured benchmark is loaded alongside the traded symbols so the
/// calendar follows its trading days, but it is never held.
pub fn simulate(
    source: &dyn PriceSource,
    orders: &[Order],
    config: &AnalysisConfig,
) -> Result<ReplayResult> {
    config.validate()?;
    let (Some(start), Some(end)) = (
        orders.iter().map(|o| o.date).min(),
        orders.iter().map(|o| o.date).max(),
    ) else {
        return Err(FolioError::empty_data("order list"));
    };

    let mut request = PriceRequest::new(traded_symbols(orders), start, end);
    if let Some(benchmark) = &config.benchmark {
        request = request.with_benchmark(benchmark.clone());
    }
    let prices = load_prices(source, &request)?;
    TradeSimulator::from_config(config).replay(orders, &prices)
}
