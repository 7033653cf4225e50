//! Human-readable fund report.

use std::fmt;

use super::summary::SummaryStatistics;

/// Printable summary of a replayed fund.
#[derive(Debug, Clone)]
pub struct FundReport<'a> {
    stats: &'a SummaryStatistics,
    starting_capital: f64,
}

impl<'a> FundReport<'a> {
    /// Create a report for the given statistics.
    pub fn new(stats: &'a SummaryStatistics, starting_capital: f64) -> Self {
        Self {
            stats,
            starting_capital,
        }
    }
}

impl fmt::Display for FundReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stats.sharpe_ratio {
            Some(sharpe) => writeln!(f, "Sharpe Ratio of Fund: {sharpe}")?,
            None => writeln!(f, "Sharpe Ratio of Fund: undefined (zero volatility)")?,
        }
        writeln!(f, "Cumulative Return of Fund: {}", self.stats.cumulative_return)?;
        writeln!(f, "Standard Deviation of Fund: {}", self.stats.volatility)?;
        writeln!(f, "Average Daily Return of Fund: {}", self.stats.average_daily_return)?;
        writeln!(f, "Initial Portfolio Value: {}", self.starting_capital)?;
        write!(f, "Final Portfolio Value: {}", self.stats.end_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(sharpe_ratio: Option<f64>) -> SummaryStatistics {
        SummaryStatistics {
            average_daily_return: 0.0,
            volatility: 0.0,
            sharpe_ratio,
            cumulative_return: 0.0,
            start_value: 1000.0,
            end_value: 1000.0,
            periods: 3,
        }
    }

    #[test]
    fn test_report_lines() {
        let s = stats(Some(1.5));
        let text = FundReport::new(&s, 1000.0).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Sharpe Ratio of Fund: 1.5");
        assert_eq!(lines[4], "Initial Portfolio Value: 1000");
        assert_eq!(lines[5], "Final Portfolio Value: 1000");
    }

    #[test]
    fn test_report_undefined_sharpe() {
        let s = stats(None);
        let text = FundReport::new(&s, 1000.0).to_string();
        assert!(text.starts_with("Sharpe Ratio of Fund: undefined"));
    }
}
