//! Performance metrics for folioopt.

pub mod report;
pub mod streaming;
pub mod summary;

pub use report::FundReport;
pub use streaming::StreamingMetrics;
pub use summary::{sharpe_ratio, summarize, SummaryStatistics};
