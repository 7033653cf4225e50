//! Minimization under box bounds and a sum constraint.
//!
//! Callers hand over an objective, an initial guess, per-coordinate bounds and
//! the required coordinate sum, and get back the argmin found plus a status.
//! [`ProjectedGradient`] is the default implementation, a spectral
//! projected-gradient method:
//!
//! - gradients by central finite differences,
//! - Barzilai-Borwein step lengths,
//! - Armijo backtracking along the projected direction,
//! - exact Euclidean projection onto `{lo <= x <= hi, sum(x) = s}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{FolioError, Result};

const STEP_MIN: f64 = 1e-10;
const STEP_MAX: f64 = 1e10;
const BACKTRACK_FLOOR: f64 = 1e-12;
const PROJECTION_ITERATIONS: usize = 200;

/// A scalar function of a coordinate vector.
pub trait Objective {
    /// Evaluate at `x`. Non-finite values are treated as solver failures.
    fn value(&self, x: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64,
{
    fn value(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Per-coordinate lower and upper bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Create bounds from explicit vectors.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(FolioError::length_mismatch(lower.len(), upper.len()));
        }
        for (i, (lo, hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(FolioError::invalid_parameter(format!(
                    "bound {i} is [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Same bounds for every coordinate.
    pub fn uniform(n: usize, lower: f64, upper: f64) -> Result<Self> {
        Self::new(vec![lower; n], vec![upper; n])
    }

    /// Number of coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Lower bounds.
    #[inline]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds.
    #[inline]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Check whether `x` lies within the bounds up to `tol`.
    pub fn contains(&self, x: &[f64], tol: f64) -> bool {
        x.len() == self.len()
            && x
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| *v >= lo - tol && *v <= hi + tol)
    }

    /// Euclidean projection of `v` onto `{lower <= x <= upper, sum(x) = total}`.
    ///
    /// Returns `None` when the set is empty or `v` is not finite. The projection is
    /// `clamp(v - tau)` for the shift `tau` solving the sum equation, found by
    /// bisection since the clamped sum is monotone in `tau`.
    pub fn project_with_sum(&self, v: &[f64], total: f64) -> Option<Vec<f64>> {
        let lo_sum: f64 = self.lower.iter().sum();
        let hi_sum: f64 = self.upper.iter().sum();
        if v.len() != self.len() || lo_sum > total + 1e-12 || hi_sum < total - 1e-12 {
            return None;
        }
        if v.iter().any(|x| !x.is_finite()) {
            return None;
        }

        let clamped_sum = |tau: f64| -> f64 {
            v.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(x, (lo, hi))| (x - tau).clamp(*lo, *hi))
                .sum()
        };

        // At tau_low every coordinate sits at its upper bound, at tau_high at its lower.
        let mut tau_low = v
            .iter()
            .zip(self.upper.iter())
            .map(|(x, hi)| x - hi)
            .fold(f64::INFINITY, f64::min);
        let mut tau_high = v
            .iter()
            .zip(self.lower.iter())
            .map(|(x, lo)| x - lo)
            .fold(f64::NEG_INFINITY, f64::max);

        for _ in 0..PROJECTION_ITERATIONS {
            let mid = 0.5 * (tau_low + tau_high);
            if clamped_sum(mid) > total {
                tau_low = mid;
            } else {
                tau_high = mid;
            }
            if tau_high - tau_low <= f64::EPSILON * tau_high.abs().max(1.0) {
                break;
            }
        }

        let tau = 0.5 * (tau_low + tau_high);
        Some(
            v.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(x, (lo, hi))| (x - tau).clamp(*lo, *hi))
                .collect(),
        )
    }
}

/// A minimization problem over a bounded, fixed-sum domain.
pub struct ConstrainedProblem<'a> {
    /// Function to minimize.
    pub objective: &'a dyn Objective,
    /// Starting point (projected onto the feasible set before iterating).
    pub initial: Vec<f64>,
    /// Per-coordinate bounds.
    pub bounds: Bounds,
    /// Required sum of coordinates.
    pub total: f64,
}

impl<'a> ConstrainedProblem<'a> {
    /// Create a problem whose coordinates must sum to `total`.
    pub fn new(objective: &'a dyn Objective, initial: Vec<f64>, bounds: Bounds, total: f64) -> Self {
        Self {
            objective,
            initial,
            bounds,
            total,
        }
    }
}

/// Solver tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Stop when the objective improves by less than this between iterations.
    pub ftol: f64,
    /// Stop when the projected gradient (infinity norm) falls below this.
    pub pgtol: f64,
    /// Relative finite-difference step for gradients.
    pub fd_step: f64,
    /// Armijo sufficient-decrease constant.
    pub armijo: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            ftol: 1e-12,
            pgtol: 1e-6,
            fd_step: 1e-6,
            armijo: 1e-4,
        }
    }
}

impl SolverSettings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(FolioError::invalid_config("solver.max_iterations must be positive"));
        }
        for (name, value) in [
            ("solver.ftol", self.ftol),
            ("solver.pgtol", self.pgtol),
            ("solver.fd_step", self.fd_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FolioError::invalid_config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.armijo > 0.0 && self.armijo < 1.0) {
            return Err(FolioError::invalid_config(format!(
                "solver.armijo must be in (0, 1), got {}",
                self.armijo
            )));
        }
        Ok(())
    }
}

/// Termination status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// A convergence criterion was met.
    Converged,
    /// The iteration cap was reached first.
    IterationLimit,
    /// The objective or its gradient became NaN or infinite.
    NonFiniteObjective,
    /// Backtracking could not find a decreasing step.
    LineSearchFailed,
    /// Bounds and the sum constraint admit no point.
    Infeasible,
    /// The starting point or a trial step overflowed to NaN or infinity.
    NonFinitePoint,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SolverStatus::Converged => "converged",
            SolverStatus::IterationLimit => "iteration limit reached",
            SolverStatus::NonFiniteObjective => "objective is not finite",
            SolverStatus::LineSearchFailed => "line search failed",
            SolverStatus::Infeasible => "constraints are infeasible",
            SolverStatus::NonFinitePoint => "point is not finite",
        };
        f.write_str(text)
    }
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    /// Last accepted point.
    pub x: Vec<f64>,
    /// Objective at `x`.
    pub objective: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Termination status.
    pub status: SolverStatus,
}

impl SolverOutcome {
    /// Whether the solve met a convergence criterion.
    #[inline]
    pub fn converged(&self) -> bool {
        self.status == SolverStatus::Converged
    }
}

/// Minimizes an objective over a bounded, fixed-sum domain.
pub trait Minimizer {
    /// Solve `problem`. Errors are reserved for malformed problems; a solve
    /// that fails to converge returns an outcome with a non-converged status.
    fn minimize(&self, problem: &ConstrainedProblem<'_>) -> Result<SolverOutcome>;
}

/// Spectral projected-gradient minimizer.
#[derive(Debug, Clone, Default)]
pub struct ProjectedGradient {
    /// Tuning knobs.
    pub settings: SolverSettings,
}

impl ProjectedGradient {
    /// Create a minimizer with the given settings.
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    fn gradient(&self, objective: &dyn Objective, x: &[f64]) -> Vec<f64> {
        let mut shifted = x.to_vec();
        (0..x.len())
            .map(|i| {
                let h = self.settings.fd_step * x[i].abs().max(1.0);
                shifted[i] = x[i] + h;
                let forward = objective.value(&shifted);
                shifted[i] = x[i] - h;
                let backward = objective.value(&shifted);
                shifted[i] = x[i];
                (forward - backward) / (2.0 * h)
            })
            .collect()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x - y).collect()
}

/// Project `v`, naming the reason when no projection exists.
fn project_point(
    bounds: &Bounds,
    v: &[f64],
    total: f64,
) -> std::result::Result<Vec<f64>, SolverStatus> {
    if v.iter().any(|x| !x.is_finite()) {
        return Err(SolverStatus::NonFinitePoint);
    }
    bounds
        .project_with_sum(v, total)
        .ok_or(SolverStatus::Infeasible)
}

impl Minimizer for ProjectedGradient {
    fn minimize(&self, problem: &ConstrainedProblem<'_>) -> Result<SolverOutcome> {
        let n = problem.initial.len();
        if n == 0 {
            return Err(FolioError::empty_data("initial guess"));
        }
        if problem.bounds.len() != n {
            return Err(FolioError::length_mismatch(n, problem.bounds.len()));
        }
        let settings = &self.settings;
        let objective = problem.objective;
        let project = |v: &[f64]| project_point(&problem.bounds, v, problem.total);
        let outcome = |x: Vec<f64>, objective: f64, iterations: usize, status: SolverStatus| {
            SolverOutcome {
                x,
                objective,
                iterations,
                status,
            }
        };

        let mut x = match project(&problem.initial) {
            Ok(x) => x,
            Err(status) => return Ok(outcome(problem.initial.clone(), f64::NAN, 0, status)),
        };
        let mut f = objective.value(&x);
        if !f.is_finite() {
            return Ok(outcome(x, f, 0, SolverStatus::NonFiniteObjective));
        }
        let mut g = self.gradient(objective, &x);
        let mut step = f64::NAN;

        for iteration in 1..=settings.max_iterations {
            if g.iter().any(|v| !v.is_finite()) {
                return Ok(outcome(x, f, iteration - 1, SolverStatus::NonFiniteObjective));
            }

            let unit: Vec<f64> = x.iter().zip(g.iter()).map(|(xi, gi)| xi - gi).collect();
            let unit_target = match project(&unit) {
                Ok(target) => target,
                Err(status) => return Ok(outcome(x, f, iteration - 1, status)),
            };
            let pg_norm = inf_norm(&difference(&unit_target, &x));
            if pg_norm <= settings.pgtol {
                return Ok(outcome(x, f, iteration - 1, SolverStatus::Converged));
            }
            if step.is_nan() {
                step = (1.0 / pg_norm).clamp(STEP_MIN, STEP_MAX);
            }

            let scaled: Vec<f64> = x
                .iter()
                .zip(g.iter())
                .map(|(xi, gi)| xi - step * gi)
                .collect();
            let target = match project(&scaled) {
                Ok(target) => target,
                Err(status) => return Ok(outcome(x, f, iteration - 1, status)),
            };
            let direction = difference(&target, &x);
            let slope = dot(&g, &direction);
            if slope >= 0.0 {
                return Ok(outcome(x, f, iteration - 1, SolverStatus::LineSearchFailed));
            }

            let mut lambda = 1.0;
            let (x_new, f_new) = loop {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(direction.iter())
                    .map(|(xi, di)| xi + lambda * di)
                    .collect();
                let value = objective.value(&candidate);
                if value.is_finite() && value <= f + settings.armijo * lambda * slope {
                    break (candidate, value);
                }
                lambda *= 0.5;
                if lambda < BACKTRACK_FLOOR {
                    return Ok(outcome(x, f, iteration, SolverStatus::LineSearchFailed));
                }
            };

            let g_new = self.gradient(objective, &x_new);
            let s = difference(&x_new, &x);
            let y = difference(&g_new, &g);
            let sy = dot(&s, &y);
            step = if sy > 0.0 {
                (dot(&s, &s) / sy).clamp(STEP_MIN, STEP_MAX)
            } else {
                STEP_MAX
            };

            let improvement = f - f_new;
            debug!(iteration, objective = f_new, lambda, pg_norm, "projected gradient step");
            x = x_new;
            f = f_new;
            g = g_new;

            if improvement.abs() <= settings.ftol {
                return Ok(outcome(x, f, iteration, SolverStatus::Converged));
            }
        }

        Ok(outcome(x, f, settings.max_iterations, SolverStatus::IterationLimit))
    }
}
