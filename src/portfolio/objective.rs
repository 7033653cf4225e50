//! Portfolio volatility as a function of allocation weights.

use crate::core::error::{FolioError, Result};
use crate::data::prices::NormalizedPriceTable;
use crate::metrics::streaming::StreamingMetrics;

/// Minimum number of rows needed for a sample standard deviation of returns.
pub const MIN_ROWS: usize = 3;

/// Sample standard deviation of the daily returns of a weighted portfolio.
///
/// For weights `w`, the portfolio value on day `t` is the normalized price row
/// dotted with `w`; returns are `value[t] / value[t - 1] - 1`.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityObjective<'a> {
    prices: &'a NormalizedPriceTable,
}

impl<'a> VolatilityObjective<'a> {
    /// Wrap a normalized table.
    pub fn new(prices: &'a NormalizedPriceTable) -> Result<Self> {
        if prices.len() < MIN_ROWS {
            return Err(FolioError::insufficient_data(MIN_ROWS, prices.len()));
        }
        if prices.num_symbols() == 0 {
            return Err(FolioError::empty_data("volatility objective"));
        }
        Ok(Self { prices })
    }

    /// Number of weights the objective expects.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.prices.num_symbols()
    }

    /// Volatility for the given weights.
    ///
    /// Returns NaN for a weight vector of the wrong length or one that drives
    /// a portfolio value to zero, so a solver sees an invalid point rather
    /// than an error it cannot handle.
    pub fn evaluate(&self, weights: &[f64]) -> f64 {
        let Ok(values) = self.prices.weighted_values(weights) else {
            return f64::NAN;
        };
        let mut metrics = StreamingMetrics::new();
        for t in 1..values.len() {
            let previous = values[t - 1];
            if previous == 0.0 {
                return f64::NAN;
            }
            metrics.update(values[t] / previous - 1.0);
        }
        metrics.std_dev()
    }
}
