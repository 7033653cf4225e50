//! Commission charged per executed order.

use serde::{Deserialize, Serialize};

/// Commission of one order, independent of its size and price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeeModel {
    /// No fees.
    None,
    /// Flat fee per order.
    Fixed(f64),
}

impl Default for FeeModel {
    fn default() -> Self {
        FeeModel::Fixed(9.95)
    }
}

impl FeeModel {
    /// Create a flat per-order fee model.
    pub fn fixed(amount: f64) -> Self {
        FeeModel::Fixed(amount)
    }

    /// Commission for one order.
    #[inline]
    pub fn calculate(&self) -> f64 {
        match self {
            FeeModel::None => 0.0,
            FeeModel::Fixed(amount) => *amount,
        }
    }
}
