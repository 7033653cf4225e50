//! Capital allocation across a symbol set.

use tracing::{info, warn};

use super::objective::VolatilityObjective;
use super::solver::{Bounds, ConstrainedProblem, Minimizer, ProjectedGradient};
use crate::core::config::AnalysisConfig;
use crate::core::error::{FolioError, Result};
use crate::core::timeseries::TimeSeries;
use crate::core::types::AllocationVector;
use crate::data::prices::PriceTable;
use crate::data::source::{load_prices, PriceRequest, PriceSource};
use crate::metrics::summary::{summarize, SummaryStatistics};

/// Allocation strategy for distributing capital across instruments.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AllocationStrategy {
    /// Equal weight across all instruments.
    EqualWeight,
    /// Fixed weight for each instrument, in symbol order.
    FixedWeight(Vec<f64>),
    /// Weights minimizing the volatility of daily portfolio returns.
    #[default]
    MinimumVolatility,
}

/// Allocation together with its realized history.
#[derive(Debug, Clone)]
pub struct AllocationResult {
    /// Weights per symbol.
    pub allocation: AllocationVector,
    /// Volatility of daily returns under `allocation`.
    pub volatility: f64,
    /// Solver iterations (zero for non-optimized strategies).
    pub iterations: usize,
    /// Normalized portfolio value per date, starting at 1.0.
    pub portfolio_values: TimeSeries<f64>,
}

/// Computes allocations over a price table.
#[derive(Debug, Clone)]
pub struct CapitalAllocator<M = ProjectedGradient> {
    /// Minimizer used by `MinimumVolatility`.
    pub minimizer: M,
    /// Allocation strategy.
    pub strategy: AllocationStrategy,
    /// Lower bound on every weight.
    pub min_weight: f64,
    /// Upper bound on every weight.
    pub max_weight: f64,
}

impl Default for CapitalAllocator<ProjectedGradient> {
    fn default() -> Self {
        Self::new()
    }
}

impl CapitalAllocator<ProjectedGradient> {
    /// Create a minimum-volatility allocator with long-only, unlevered bounds.
    pub fn new() -> Self {
        Self {
            minimizer: ProjectedGradient::default(),
            strategy: AllocationStrategy::MinimumVolatility,
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }

    /// Create an allocator using the solver settings of a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            minimizer: ProjectedGradient::new(config.solver),
            ..Self::new()
        }
    }
}

impl<M: Minimizer> CapitalAllocator<M> {
    /// Replace the minimizer.
    pub fn with_minimizer<N: Minimizer>(self, minimizer: N) -> CapitalAllocator<N> {
        CapitalAllocator {
            minimizer,
            strategy: self.strategy,
            min_weight: self.min_weight,
            max_weight: self.max_weight,
        }
    }

    /// Set allocation strategy.
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set per-weight bounds (must lie within [0, 1]).
    pub fn with_weight_bounds(mut self, min_weight: f64, max_weight: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_weight)
            || !(0.0..=1.0).contains(&max_weight)
            || min_weight > max_weight
        {
            return Err(FolioError::invalid_parameter(format!(
                "weight bounds [{min_weight}, {max_weight}] must satisfy 0 <= min <= max <= 1"
            )));
        }
        self.min_weight = min_weight;
        self.max_weight = max_weight;
        Ok(self)
    }

    /// Allocate across `symbols` using their columns in `prices`.
    ///
    /// Prices are normalized by the first row of the table before weighting.
    pub fn allocate(&self, prices: &PriceTable, symbols: &[String]) -> Result<AllocationResult> {
        let selected = prices.select(symbols)?;
        let normalized = selected.normalized();
        let objective = VolatilityObjective::new(&normalized)?;
        let n = symbols.len();

        let (weights, iterations) = match &self.strategy {
            AllocationStrategy::EqualWeight => (vec![1.0 / n as f64; n], 0),
            AllocationStrategy::FixedWeight(weights) => {
                if weights.len() != n {
                    return Err(FolioError::length_mismatch(n, weights.len()));
                }
                (weights.clone(), 0)
            }
            AllocationStrategy::MinimumVolatility => {
                let evaluate = |w: &[f64]| objective.evaluate(w);
                let problem = ConstrainedProblem::new(
                    &evaluate,
                    vec![1.0 / n as f64; n],
                    Bounds::uniform(n, self.min_weight, self.max_weight)?,
                    1.0,
                );
                let outcome = self.minimizer.minimize(&problem)?;
                if !outcome.converged() {
                    warn!(
                        status = %outcome.status,
                        iterations = outcome.iterations,
                        "volatility minimization did not converge"
                    );
                    return Err(FolioError::OptimizationFailed {
                        status: outcome.status,
                        iterations: outcome.iterations,
                        message: format!(
                            "last objective {} at weights {:?}",
                            outcome.objective, outcome.x
                        ),
                    });
                }
                (outcome.x, outcome.iterations)
            }
        };

        let allocation = AllocationVector::new(symbols.to_vec(), weights)?;
        let volatility = objective.evaluate(allocation.weights());
        let portfolio_values = normalized.portfolio_series(allocation.weights())?;
        info!(
            strategy = ?self.strategy,
            iterations,
            volatility,
            allocation = %allocation,
            "allocation computed"
        );

        Ok(AllocationResult {
            allocation,
            volatility,
            iterations,
            portfolio_values,
        })
    }
}

/// Find the minimum-volatility allocation with default solver settings.
pub fn optimize_allocation(prices: &PriceTable, symbols: &[String]) -> Result<AllocationResult> {
    CapitalAllocator::new().allocate(prices, symbols)
}

/// Optimized allocation compared against the benchmark.
#[derive(Debug, Clone)]
pub struct AllocationReport {
    /// Minimum-volatility allocation and its realized series.
    pub result: AllocationResult,
    /// Benchmark rebased to 1.0 on the same dates, when one is configured.
    pub benchmark: Option<TimeSeries<f64>>,
    /// Summary statistics of `result.portfolio_values`.
    pub statistics: SummaryStatistics,
}

/// Load the configured symbols and date range from `source` and optimize.
///
/// # Arguments
/// * `source` - Provider of daily closes
/// * `config` - Symbols, `start_date`, `end_date`, benchmark and solver settings
///
/// # Returns
/// Allocation, rebased benchmark and summary statistics, or `InvalidConfig`
/// when the symbol list or either date is missing
pub fn optimize(source: &dyn PriceSource, config: &AnalysisConfig) -> Result<AllocationReport> {
    config.validate()?;
    if config.symbols.is_empty() {
        return Err(FolioError::invalid_config(
            "symbols must list at least one instrument",
        ));
    }
    let (Some(start), Some(end)) = (config.start_date, config.end_date) else {
        return Err(FolioError::invalid_config(
            "start_date and end_date are required to optimize an allocation",
        ));
    };

    let mut request = PriceRequest::new(config.symbols.clone(), start, end);
    if let Some(benchmark) = &config.benchmark {
        request = request.with_benchmark(benchmark.clone());
    }
    let prices = load_prices(source, &request)?;

    let result = CapitalAllocator::from_config(config).allocate(&prices, &config.symbols)?;
    let benchmark = config
        .benchmark
        .as_deref()
        .map(|symbol| normalized_benchmark(&prices, symbol))
        .transpose()?;
    let statistics = summarize(&result.portfolio_values, &config.statistics())?;

    Ok(AllocationReport {
        result,
        benchmark,
        statistics,
    })
}

/// Benchmark closes rebased to start at 1.0, for comparison with
/// `AllocationResult::portfolio_values`.
pub fn normalized_benchmark(prices: &PriceTable, benchmark: &str) -> Result<TimeSeries<f64>> {
    prices.series(benchmark)?.normalized()
}
