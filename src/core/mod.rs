//! Core types and utilities for folioopt.

pub mod config;
pub mod error;
pub mod timeseries;
pub mod types;

pub use config::{AnalysisConfig, StatisticsConfig};
pub use error::{FolioError, Result};
pub use timeseries::TimeSeries;
pub use types::*;
