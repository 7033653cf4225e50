//! Streaming return statistics using Welford's algorithm.
//!
//! Enables single-pass calculation of mean, variance and Sharpe ratio.

/// Streaming statistics calculator using Welford's algorithm.
///
/// Allows incremental calculation of statistics without storing all values.
#[derive(Debug, Clone, Default)]
pub struct StreamingMetrics {
    /// Number of observations.
    count: usize,
    /// Running mean.
    mean: f64,
    /// Running M2 for variance calculation.
    m2: f64,
}

impl StreamingMetrics {
    /// Create a new streaming metrics calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a slice of values.
    pub fn from_values(values: &[f64]) -> Self {
        let mut metrics = Self::new();
        for &v in values {
            metrics.update(v);
        }
        metrics
    }

    /// Update metrics with a new value.
    ///
    /// Uses Welford's online algorithm for numerically stable variance calculation.
    pub fn update(&mut self, value: f64) {
        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Get the number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Get the running mean.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.mean
    }

    /// Get the sample variance (n - 1 denominator).
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return f64::NAN;
        }
        self.m2 / (self.count - 1) as f64
    }

    /// Get the sample standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Annualized Sharpe ratio.
    ///
    /// # Arguments
    /// * `periods_per_year` - Number of periods per year (e.g., 252 for daily)
    /// * `risk_free_rate` - Risk-free rate per period
    ///
    /// # Returns
    /// `sqrt(periods_per_year) * mean(r - rf) / std(r)`, or `None` when the
    /// standard deviation is zero or undefined.
    pub fn sharpe_ratio(&self, periods_per_year: f64, risk_free_rate: f64) -> Option<f64> {
        let std = self.std_dev();
        if !std.is_finite() || std == 0.0 {
            return None;
        }
        let excess_return = self.mean - risk_free_rate;
        Some(periods_per_year.sqrt() * excess_return / std)
    }
}
