//! Run configuration shared by the allocation and replay pipelines.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{FolioError, Result};
use crate::execution::FeeModel;
use crate::portfolio::solver::SolverSettings;

/// Default benchmark symbol added to every price request.
pub const DEFAULT_BENCHMARK: &str = "SPY";

/// Default number of trading days used to annualize ratios.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Symbols to allocate across.
    pub symbols: Vec<String>,
    /// First calendar date of the price window.
    pub start_date: Option<NaiveDate>,
    /// Last calendar date of the price window.
    pub end_date: Option<NaiveDate>,
    /// Benchmark symbol used for calendar alignment and comparison.
    pub benchmark: Option<String>,
    /// Cash held on the first date of a replay.
    pub starting_capital: f64,
    /// Flat fee charged per executed order.
    pub commission: f64,
    /// Per-period risk-free rate subtracted from daily returns.
    pub risk_free_rate: f64,
    /// Periods per year used to annualize the Sharpe ratio.
    pub trading_days_per_year: f64,
    /// Numerical solver settings.
    pub solver: SolverSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            start_date: None,
            end_date: None,
            benchmark: Some(DEFAULT_BENCHMARK.to_string()),
            starting_capital: 2_000_000.0,
            commission: 9.95,
            risk_free_rate: 0.0,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            solver: SolverSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.starting_capital.is_finite() && self.starting_capital > 0.0) {
            return Err(FolioError::invalid_config(format!(
                "starting_capital must be positive, got {}",
                self.starting_capital
            )));
        }
        if !(self.commission.is_finite() && self.commission >= 0.0) {
            return Err(FolioError::invalid_config(format!(
                "commission must be non-negative, got {}",
                self.commission
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(FolioError::invalid_config("risk_free_rate must be finite"));
        }
        if !(self.trading_days_per_year.is_finite() && self.trading_days_per_year > 0.0) {
            return Err(FolioError::invalid_config(format!(
                "trading_days_per_year must be positive, got {}",
                self.trading_days_per_year
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(FolioError::invalid_config(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        if let Some(dup) = self
            .symbols
            .iter()
            .enumerate()
            .find(|(i, s)| self.symbols[..*i].contains(s))
            .map(|(_, s)| s)
        {
            return Err(FolioError::invalid_config(format!(
                "symbol {dup} listed more than once"
            )));
        }
        self.solver.validate()
    }

    /// Statistics settings derived from this config.
    pub fn statistics(&self) -> StatisticsConfig {
        StatisticsConfig {
            risk_free_rate: self.risk_free_rate,
            trading_days_per_year: self.trading_days_per_year,
        }
    }

    /// Commission model derived from this config.
    pub fn fee_model(&self) -> FeeModel {
        if self.commission == 0.0 {
            FeeModel::None
        } else {
            FeeModel::fixed(self.commission)
        }
    }
}

/// Parameters for summary statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Per-period risk-free rate.
    pub risk_free_rate: f64,
    /// Periods per year for annualization.
    pub trading_days_per_year: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.benchmark.as_deref(), Some("SPY"));
        assert!((config.trading_days_per_year - 252.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            symbols = ["AMZN", "AAPL", "GLD"]
            start_date = "2008-06-01"
            end_date = "2010-06-01"
            commission = 0.0

            [solver]
            max_iterations = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.symbols.len(), 3);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2008, 6, 1));
        assert_eq!(config.solver.max_iterations, 50);
        assert!((config.starting_capital - 2_000_000.0).abs() < 1e-9);
        assert_eq!(config.fee_model(), FeeModel::None);
    }

    #[test]
    fn test_invalid_values() {
        let bad_capital = AnalysisConfig {
            starting_capital: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_capital.validate(),
            Err(FolioError::InvalidConfig { .. })
        ));

        let bad_commission = AnalysisConfig {
            commission: -1.0,
            ..Default::default()
        };
        assert!(bad_commission.validate().is_err());

        let reversed = AnalysisConfig {
            start_date: NaiveDate::from_ymd_opt(2010, 1, 2),
            end_date: NaiveDate::from_ymd_opt(2010, 1, 1),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());

        let duplicated = AnalysisConfig {
            symbols: vec!["IBM".into(), "IBM".into()],
            ..Default::default()
        };
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("symbols = 3"),
            Err(FolioError::ConfigParse(_))
        ));
    }
}
