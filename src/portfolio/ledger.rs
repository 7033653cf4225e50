//! Share and cash ledgers built during order replay.

use chrono::NaiveDate;
use nalgebra::DMatrix;

use crate::core::error::{FolioError, Result};
use crate::core::timeseries::TimeSeries;
use crate::data::prices::PriceTable;

/// Per-date changes in shares held and in cash.
///
/// Rows are dates, columns are symbols. The first date's cash change includes
/// the starting capital.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsDelta {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    shares: DMatrix<i64>,
    cash: Vec<f64>,
}

impl HoldingsDelta {
    /// Create an empty ledger holding only the starting capital.
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>, starting_capital: f64) -> Result<Self> {
        if dates.is_empty() || symbols.is_empty() {
            return Err(FolioError::empty_data("holdings ledger"));
        }
        let shares = DMatrix::zeros(dates.len(), symbols.len());
        let mut cash = vec![0.0; dates.len()];
        cash[0] = starting_capital;
        Ok(Self {
            dates,
            symbols,
            shares,
            cash,
        })
    }

    /// Add a share change and a cash change at (`row`, `column`).
    pub(crate) fn record(&mut self, row: usize, column: usize, shares: i64, cash: f64) {
        self.shares[(row, column)] += shares;
        self.cash[row] += cash;
    }

    /// Row dates.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column symbols.
    #[inline]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Share changes (dates x symbols).
    #[inline]
    pub fn shares(&self) -> &DMatrix<i64> {
        &self.shares
    }

    /// Cash change per date.
    #[inline]
    pub fn cash(&self) -> &[f64] {
        &self.cash
    }

    /// Running totals down the date axis.
    pub fn cumulative(&self) -> CumulativeHoldings {
        let mut shares = self.shares.clone();
        for i in 1..shares.nrows() {
            for j in 0..shares.ncols() {
                let above = shares[(i - 1, j)];
                shares[(i, j)] += above;
            }
        }
        let cash = self
            .cash
            .iter()
            .scan(0.0, |total, c| {
                *total += c;
                Some(*total)
            })
            .collect();
        CumulativeHoldings {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            shares,
            cash,
        }
    }
}

/// Shares held and cash on hand at the close of each date.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeHoldings {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    shares: DMatrix<i64>,
    cash: Vec<f64>,
}

impl CumulativeHoldings {
    /// Row dates.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column symbols.
    #[inline]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Shares held (dates x symbols). Negative entries are short positions.
    #[inline]
    pub fn shares(&self) -> &DMatrix<i64> {
        &self.shares
    }

    /// Cash per date.
    #[inline]
    pub fn cash(&self) -> &[f64] {
        &self.cash
    }

    /// Shares of `symbol` held at the close of `date`.
    pub fn shares_on(&self, date: NaiveDate, symbol: &str) -> Option<i64> {
        let i = self.dates.binary_search(&date).ok()?;
        let j = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.shares[(i, j)])
    }

    /// Cash at the close of `date`.
    pub fn cash_on(&self, date: NaiveDate) -> Option<f64> {
        let i = self.dates.binary_search(&date).ok()?;
        Some(self.cash[i])
    }

    /// Non-zero positions after the last date.
    pub fn final_positions(&self) -> Vec<(String, i64)> {
        let last = self.dates.len() - 1;
        self.symbols
            .iter()
            .enumerate()
            .filter(|(j, _)| self.shares[(last, *j)] != 0)
            .map(|(j, s)| (s.clone(), self.shares[(last, j)]))
            .collect()
    }

    /// Portfolio value per date: cash plus shares marked at that date's close.
    pub fn value_series(&self, prices: &PriceTable) -> Result<TimeSeries<f64>> {
        let columns = self
            .symbols
            .iter()
            .map(|s| {
                prices
                    .symbol_index(s)
                    .ok_or_else(|| FolioError::missing_price(s.clone(), self.dates[0]))
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut values = Vec::with_capacity(self.dates.len());
        for (i, date) in self.dates.iter().enumerate() {
            let row = prices
                .date_index(*date)
                .ok_or_else(|| FolioError::missing_price(self.symbols[0].clone(), *date))?;
            let holdings: f64 = columns
                .iter()
                .enumerate()
                .map(|(j, &col)| self.shares[(i, j)] as f64 * prices.closes()[(row, col)])
                .sum();
            values.push(self.cash[i] + holdings);
        }
        TimeSeries::new(self.dates.clone(), values)
    }
}
