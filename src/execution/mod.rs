//! Order execution costs.

pub mod fees;

pub use fees::FeeModel;
