//! Price source contract and request alignment.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::info;

use super::align::{align, FillPolicy};
use super::prices::PriceTable;
use crate::core::error::{FolioError, Result};
use crate::core::types::Price;

/// Provider of daily closing prices.
///
/// Implementations own transport concerns (rate limits, retries, caching).
pub trait PriceSource {
    /// Daily closes for `symbol` on or between `start` and `end`, in any order.
    fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Price)>>;
}

/// Price source backed by series loaded up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<String, BTreeMap<NaiveDate, Price>>,
}

impl InMemoryPriceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a symbol's closes.
    pub fn with_series<I>(mut self, symbol: impl Into<String>, closes: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Price)>,
    {
        self.insert(symbol, closes);
        self
    }

    /// Add or replace a symbol's closes.
    pub fn insert<I>(&mut self, symbol: impl Into<String>, closes: I)
    where
        I: IntoIterator<Item = (NaiveDate, Price)>,
    {
        self.series
            .insert(symbol.into(), closes.into_iter().collect());
    }
}

impl PriceSource for InMemoryPriceSource {
    fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Price)>> {
        let series = self.series.get(symbol).ok_or_else(|| {
            FolioError::missing_price(symbol, start)
        })?;
        Ok(series
            .range(start..=end)
            .map(|(d, p)| (*d, *p))
            .collect())
    }
}

/// Symbols and calendar window to load.
#[derive(Debug, Clone)]
pub struct PriceRequest {
    /// Symbols to load.
    pub symbols: Vec<String>,
    /// First calendar date (inclusive).
    pub start: NaiveDate,
    /// Last calendar date (inclusive).
    pub end: NaiveDate,
    /// Benchmark prepended to the columns when not already requested.
    pub benchmark: Option<String>,
    /// Gap filling policy.
    pub fill: FillPolicy,
}

impl PriceRequest {
    /// Create a request with the default fill policy and no benchmark.
    pub fn new(symbols: Vec<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbols,
            start,
            end,
            benchmark: None,
            fill: FillPolicy::default(),
        }
    }

    /// Set the benchmark symbol.
    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = Some(benchmark.into());
        self
    }

    /// Set the fill policy.
    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }

    /// Columns in load order: benchmark first, then requested symbols.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.symbols.len() + 1);
        if let Some(benchmark) = &self.benchmark {
            if !self.symbols.contains(benchmark) {
                columns.push(benchmark.clone());
            }
        }
        for symbol in &self.symbols {
            if !columns.contains(symbol) {
                columns.push(symbol.clone());
            }
        }
        columns
    }
}

/// Load and align prices for a request.
///
/// The date axis is every calendar date in the window on which at least one
/// column quoted, so weekends and market holidays never become rows.
pub fn load_prices(source: &dyn PriceSource, request: &PriceRequest) -> Result<PriceTable> {
    if request.start > request.end {
        return Err(FolioError::invalid_parameter(format!(
            "start {} is after end {}",
            request.start, request.end
        )));
    }
    let columns = request.columns();
    if columns.is_empty() {
        return Err(FolioError::empty_data("price request"));
    }

    let mut fetched = Vec::with_capacity(columns.len());
    let mut trading_days = BTreeSet::new();
    for symbol in &columns {
        let closes: BTreeMap<NaiveDate, Price> = source
            .daily_closes(symbol, request.start, request.end)?
            .into_iter()
            .filter(|(d, p)| *d >= request.start && *d <= request.end && p.is_finite())
            .collect();
        if closes.is_empty() {
            return Err(FolioError::missing_price(symbol.clone(), request.start));
        }
        trading_days.extend(closes.keys().copied());
        fetched.push((symbol.clone(), closes));
    }

    let dates: Vec<NaiveDate> = trading_days.into_iter().collect();
    let raw = fetched
        .into_iter()
        .map(|(symbol, closes)| {
            let cells: Vec<Option<Price>> = dates.iter().map(|d| closes.get(d).copied()).collect();
            (symbol, cells)
        })
        .collect::<Vec<(String, Vec<Option<Price>>)>>();

    let table = align(dates, raw, request.fill)?;
    info!(
        symbols = table.symbols().len(),
        rows = table.len(),
        start = %request.start,
        end = %request.end,
        "loaded aligned prices"
    );
    Ok(table)
}
