//! Allocation optimization and order replay.

pub mod allocation;
pub mod engine;
pub mod ledger;
pub mod objective;
pub mod solver;

pub use allocation::{
    normalized_benchmark, optimize, optimize_allocation, AllocationReport, AllocationResult,
    AllocationStrategy, CapitalAllocator,
};
pub use engine::{simulate, ReplayResult, TradeSimulator};
pub use ledger::{CumulativeHoldings, HoldingsDelta};
pub use objective::VolatilityObjective;
pub use solver::{
    Bounds, ConstrainedProblem, Minimizer, Objective, ProjectedGradient, SolverOutcome,
    SolverSettings, SolverStatus,
};
