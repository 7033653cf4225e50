//! Aligned closing-price tables.

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};

use crate::core::error::{FolioError, Result};
use crate::core::timeseries::TimeSeries;
use crate::core::types::Price;

/// Closing prices indexed by date (rows) and symbol (columns).
///
/// Every cell holds a positive finite price. Tables are immutable; selection,
/// restriction and normalization return new tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    closes: DMatrix<Price>,
}

impl PriceTable {
    /// Build a table from row-major closes (`rows[date][symbol]`).
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>, rows: Vec<Vec<Price>>) -> Result<Self> {
        if dates.is_empty() || symbols.is_empty() {
            return Err(FolioError::empty_data("price table"));
        }
        if rows.len() != dates.len() {
            return Err(FolioError::length_mismatch(dates.len(), rows.len()));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != symbols.len()) {
            return Err(FolioError::length_mismatch(symbols.len(), row.len()));
        }
        let flat: Vec<Price> = rows.into_iter().flatten().collect();
        let closes = DMatrix::from_row_slice(dates.len(), symbols.len(), &flat);
        Self::from_matrix(dates, symbols, closes)
    }

    /// Build a table from one price vector per symbol.
    pub fn from_columns(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<Price>)>) -> Result<Self> {
        if dates.is_empty() || columns.is_empty() {
            return Err(FolioError::empty_data("price table"));
        }
        if let Some((_, col)) = columns.iter().find(|(_, c)| c.len() != dates.len()) {
            return Err(FolioError::length_mismatch(dates.len(), col.len()));
        }
        let n_rows = dates.len();
        let closes = DMatrix::from_fn(n_rows, columns.len(), |i, j| columns[j].1[i]);
        let symbols = columns.into_iter().map(|(s, _)| s).collect();
        Self::from_matrix(dates, symbols, closes)
    }

    fn from_matrix(dates: Vec<NaiveDate>, symbols: Vec<String>, closes: DMatrix<Price>) -> Result<Self> {
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(FolioError::invalid_price_table(format!(
                "dates must be strictly ascending without duplicates ({} then {})",
                w[0], w[1]
            )));
        }
        for (j, symbol) in symbols.iter().enumerate() {
            if symbol.trim().is_empty() {
                return Err(FolioError::invalid_price_table("empty symbol name"));
            }
            if symbols[..j].contains(symbol) {
                return Err(FolioError::invalid_price_table(format!(
                    "symbol {symbol} appears more than once"
                )));
            }
        }
        for j in 0..closes.ncols() {
            for i in 0..closes.nrows() {
                let price = closes[(i, j)];
                if price.is_nan() {
                    return Err(FolioError::missing_price(symbols[j].clone(), dates[i]));
                }
                if !price.is_finite() || price <= 0.0 {
                    return Err(FolioError::invalid_price_table(format!(
                        "{} on {} has non-positive price {price}",
                        symbols[j], dates[i]
                    )));
                }
            }
        }
        Ok(Self {
            dates,
            symbols,
            closes,
        })
    }

    /// Number of dates.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a constructed table.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
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

    /// Underlying matrix (dates x symbols).
    #[inline]
    pub fn closes(&self) -> &DMatrix<Price> {
        &self.closes
    }

    /// Column position of a symbol.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Row position of a date.
    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Check whether a symbol is present.
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbol_index(symbol).is_some()
    }

    /// Closing price of a symbol on a date.
    pub fn price(&self, date: NaiveDate, symbol: &str) -> Option<Price> {
        let i = self.date_index(date)?;
        let j = self.symbol_index(symbol)?;
        Some(self.closes[(i, j)])
    }

    /// Closing prices of one symbol as a series.
    pub fn series(&self, symbol: &str) -> Result<TimeSeries<Price>> {
        let j = self.symbol_index(symbol).ok_or_else(|| {
            FolioError::invalid_parameter(format!("symbol {symbol} not in price table"))
        })?;
        TimeSeries::new(self.dates.clone(), self.closes.column(j).iter().copied().collect())
    }

    /// Keep only the given symbols, in the order requested.
    pub fn select(&self, symbols: &[String]) -> Result<Self> {
        if symbols.is_empty() {
            return Err(FolioError::empty_data("symbol selection"));
        }
        let mut indices = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let j = self.symbol_index(symbol).ok_or_else(|| {
                FolioError::missing_price(symbol.clone(), self.dates[0])
            })?;
            if indices.contains(&j) {
                return Err(FolioError::invalid_parameter(format!(
                    "symbol {symbol} selected more than once"
                )));
            }
            indices.push(j);
        }
        Ok(Self {
            dates: self.dates.clone(),
            symbols: symbols.to_vec(),
            closes: self.closes.select_columns(indices.iter()),
        })
    }

    /// Keep only rows within `[start, end]`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start && **d <= end)
            .map(|(i, _)| i)
            .collect();
        if rows.is_empty() {
            return Err(FolioError::empty_data(format!(
                "price table between {start} and {end}"
            )));
        }
        Ok(Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            symbols: self.symbols.clone(),
            closes: self.closes.select_rows(rows.iter()),
        })
    }

    /// Divide every column by its first-row price.
    pub fn normalized(&self) -> NormalizedPriceTable {
        let mut values = self.closes.clone();
        for (j, mut column) in values.column_iter_mut().enumerate() {
            let base = self.closes[(0, j)];
            column /= base;
        }
        NormalizedPriceTable {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            values,
        }
    }
}

/// Price table with every column rebased to start at 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    values: DMatrix<f64>,
}

impl NormalizedPriceTable {
    /// Number of dates.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a table built from a `PriceTable`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of symbols.
    #[inline]
    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
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

    /// Underlying matrix (dates x symbols).
    #[inline]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Daily portfolio value for the given weights (normalized row · weights).
    pub fn weighted_values(&self, weights: &[f64]) -> Result<DVector<f64>> {
        if weights.len() != self.symbols.len() {
            return Err(FolioError::length_mismatch(self.symbols.len(), weights.len()));
        }
        Ok(&self.values * DVector::from_column_slice(weights))
    }

    /// Daily portfolio value for the given weights as a dated series.
    pub fn portfolio_series(&self, weights: &[f64]) -> Result<TimeSeries<f64>> {
        let values = self.weighted_values(weights)?;
        TimeSeries::new(self.dates.clone(), values.iter().copied().collect())
    }
}
