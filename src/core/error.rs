//! Error types for folioopt.

use chrono::NaiveDate;
use thiserror::Error;

use crate::portfolio::solver::SolverStatus;

/// Result type alias for folioopt operations.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Error types for the allocation and replay pipelines.
#[derive(Error, Debug)]
pub enum FolioError {
    /// A requested symbol/date has no resolvable price.
    #[error("Missing price data for {symbol} on {date}")]
    MissingPriceData { symbol: String, date: NaiveDate },

    /// The numerical solver did not converge.
    #[error("Optimization failed after {iterations} iterations ({status}): {message}")]
    OptimizationFailed {
        status: SolverStatus,
        iterations: usize,
        message: String,
    },

    /// A statistic has no defined value for the given series.
    #[error("Undefined statistic {statistic}: {reason}")]
    UndefinedStatistic {
        statistic: &'static str,
        reason: String,
    },

    /// An order cannot be parsed or priced.
    #[error("Invalid order: {message}")]
    InvalidOrder { message: String },

    /// Price table shape or content is invalid.
    #[error("Invalid price table: {message}")]
    InvalidPriceTable { message: String },

    /// Data length mismatch between arrays.
    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Invalid parameter value.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Insufficient data for calculation.
    #[error("Insufficient data: need at least {required} elements, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Empty data error.
    #[error("Empty data provided for {context}")]
    EmptyData { context: String },

    /// Configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl FolioError {
    /// Create a missing price data error.
    pub fn missing_price(symbol: impl Into<String>, date: NaiveDate) -> Self {
        Self::MissingPriceData {
            symbol: symbol.into(),
            date,
        }
    }

    /// Create an undefined statistic error.
    pub fn undefined_statistic(statistic: &'static str, reason: impl Into<String>) -> Self {
        Self::UndefinedStatistic {
            statistic,
            reason: reason.into(),
        }
    }

    /// Create an invalid order error.
    pub fn invalid_order(message: impl Into<String>) -> Self {
        Self::InvalidOrder {
            message: message.into(),
        }
    }

    /// Create an invalid price table error.
    pub fn invalid_price_table(message: impl Into<String>) -> Self {
        Self::InvalidPriceTable {
            message: message.into(),
        }
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an empty data error.
    pub fn empty_data(context: impl Into<String>) -> Self {
        Self::EmptyData {
            context: context.into(),
        }
    }
}
