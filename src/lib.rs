//! folioopt - portfolio allocation and order replay.
//!
//! This crate provides two pipelines over aligned daily closing prices:
//! - Minimum-volatility allocation under full-investment and per-asset bounds
//! - Replay of dated BUY/SELL orders into a daily portfolio value series
//!
//! Value series from both pipelines go through `metrics::summarize` (average
//! daily return, volatility, Sharpe ratio, cumulative return): `portfolio::optimize`
//! returns the statistics with the allocation, and replay results compute them
//! with `ReplayResult::statistics`.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use folioopt::data::{load_prices, InMemoryPriceSource, PriceRequest};
//! use folioopt::portfolio::optimize_allocation;
//!
//! # fn main() -> folioopt::core::Result<()> {
//! let source = InMemoryPriceSource::new();
//! let symbols = vec!["AAPL".to_string(), "GLD".to_string()];
//! let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2010, 12, 31).unwrap();
//! let prices = load_prices(&source, &PriceRequest::new(symbols.clone(), start, end))?;
//! let result = optimize_allocation(&prices, &symbols)?;
//! println!("{}", result.allocation);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod execution;
pub mod metrics;
pub mod portfolio;

pub use crate::core::{AnalysisConfig, FolioError, Result};
