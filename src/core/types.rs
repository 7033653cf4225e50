//! Core data types for folioopt.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{FolioError, Result};

/// Type alias for price values.
pub type Price = f64;

/// Date format used by order records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tolerance used when checking that allocation weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    /// Buy shares with cash.
    Buy,
    /// Sell shares for cash.
    Sell,
}

impl OrderAction {
    /// Sign applied to the share count (+1 for buys, -1 for sells).
    #[inline]
    pub fn share_sign(self) -> i64 {
        match self {
            OrderAction::Buy => 1,
            OrderAction::Sell => -1,
        }
    }

    /// Sign applied to the cash flow, opposite to the share sign.
    #[inline]
    pub fn cash_sign(self) -> f64 {
        -(self.share_sign() as f64)
    }
}

impl FromStr for OrderAction {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderAction::Buy),
            "SELL" => Ok(OrderAction::Sell),
            other => Err(FolioError::invalid_order(format!(
                "unknown order action '{other}' (expected BUY or SELL)"
            ))),
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "BUY"),
            OrderAction::Sell => write!(f, "SELL"),
        }
    }
}

/// A single dated order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Execution date (the order fills at that day's close).
    pub date: NaiveDate,
    /// Ticker symbol.
    pub symbol: String,
    /// Buy or sell.
    pub action: OrderAction,
    /// Number of shares, always positive.
    pub shares: u64,
}

impl Order {
    /// Create a validated order.
    pub fn new(
        date: NaiveDate,
        symbol: impl Into<String>,
        action: OrderAction,
        shares: u64,
    ) -> Result<Self> {
        let order = Self {
            date,
            symbol: symbol.into(),
            action,
            shares,
        };
        order.validate()?;
        Ok(order)
    }

    /// Check the symbol is non-blank and the share count is positive and
    /// representable as a signed holding change.
    pub fn validate(&self) -> Result<()> {
        let Self {
            date,
            symbol,
            action,
            shares,
        } = self;
        if symbol.trim().is_empty() {
            return Err(FolioError::invalid_order(format!(
                "order on {date} has an empty symbol"
            )));
        }
        if *shares == 0 {
            return Err(FolioError::invalid_order(format!(
                "{action} {symbol} on {date} has zero shares"
            )));
        }
        if i64::try_from(*shares).is_err() {
            return Err(FolioError::invalid_order(format!(
                "{action} {symbol} on {date}: {shares} shares exceeds {}",
                i64::MAX
            )));
        }
        Ok(())
    }

    /// Shorthand for a buy order.
    pub fn buy(date: NaiveDate, symbol: impl Into<String>, shares: u64) -> Result<Self> {
        Self::new(date, symbol, OrderAction::Buy, shares)
    }

    /// Shorthand for a sell order.
    pub fn sell(date: NaiveDate, symbol: impl Into<String>, shares: u64) -> Result<Self> {
        Self::new(date, symbol, OrderAction::Sell, shares)
    }

    /// Signed change in shares held caused by this order.
    #[inline]
    pub fn signed_shares(&self) -> i64 {
        self.action.share_sign() * i64::try_from(self.shares).unwrap_or(i64::MAX)
    }
}

/// Raw tabular order row as it appears in an orders file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Order")]
    pub order: String,
    #[serde(rename = "Shares")]
    pub shares: i64,
}

impl TryFrom<OrderRecord> for Order {
    type Error = FolioError;

    fn try_from(record: OrderRecord) -> Result<Self> {
        let date = NaiveDate::parse_from_str(record.date.trim(), DATE_FORMAT).map_err(|e| {
            FolioError::invalid_order(format!("bad date '{}': {e}", record.date))
        })?;
        let action: OrderAction = record.order.parse()?;
        if record.shares <= 0 {
            return Err(FolioError::invalid_order(format!(
                "{action} {} on {date} has non-positive share count {}",
                record.symbol, record.shares
            )));
        }
        Order::new(date, record.symbol.trim(), action, record.shares as u64)
    }
}

/// Convert raw records into orders sorted by date.
///
/// The sort is stable, so orders sharing a date keep their input order.
pub fn orders_from_records(records: Vec<OrderRecord>) -> Result<Vec<Order>> {
    let mut orders = records
        .into_iter()
        .map(Order::try_from)
        .collect::<Result<Vec<_>>>()?;
    orders.sort_by_key(|o| o.date);
    Ok(orders)
}

/// Fraction of capital assigned to each symbol.
///
/// Weights are non-negative, at most one, and sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationVector {
    symbols: Vec<String>,
    weights: Vec<f64>,
}

impl AllocationVector {
    /// Create a validated allocation.
    pub fn new(symbols: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        if symbols.len() != weights.len() {
            return Err(FolioError::length_mismatch(symbols.len(), weights.len()));
        }
        if symbols.is_empty() {
            return Err(FolioError::empty_data("allocation"));
        }
        for (symbol, &w) in symbols.iter().zip(weights.iter()) {
            if !w.is_finite() || w < -WEIGHT_SUM_TOLERANCE || w > 1.0 + WEIGHT_SUM_TOLERANCE {
                return Err(FolioError::invalid_parameter(format!(
                    "weight {w} for {symbol} is outside [0, 1]"
                )));
            }
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FolioError::invalid_parameter(format!(
                "weights sum to {total}, expected 1"
            )));
        }
        // Clamp away solver round-off below zero.
        let weights = weights.into_iter().map(|w| w.clamp(0.0, 1.0)).collect();
        Ok(Self { symbols, weights })
    }

    /// Uniform allocation across the given symbols.
    pub fn equal_weight(symbols: Vec<String>) -> Result<Self> {
        let n = symbols.len();
        if n == 0 {
            return Err(FolioError::empty_data("allocation"));
        }
        Self::new(symbols, vec![1.0 / n as f64; n])
    }

    /// Symbols in allocation order.
    #[inline]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Weights in allocation order.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight of a single symbol.
    pub fn weight(&self, symbol: &str) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.weights[i])
    }

    /// Number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterator over (symbol, weight) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }
}

impl fmt::Display for AllocationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(symbol, w)| format!("{symbol}: {w:.4}"))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
