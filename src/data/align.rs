//! Gap filling and row alignment for raw price columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prices::PriceTable;
use crate::core::error::{FolioError, Result};
use crate::core::types::Price;

/// How gaps inside a column are resolved before incomplete rows are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillPolicy {
    /// Carry the last known price forward.
    pub forward: bool,
    /// Carry the next known price backward (applied after forward fill).
    pub backward: bool,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            forward: true,
            backward: true,
        }
    }
}

impl FillPolicy {
    /// Drop any row with a gap, never fill.
    pub fn none() -> Self {
        Self {
            forward: false,
            backward: false,
        }
    }

    /// Fill one column in place.
    pub fn apply(&self, column: &mut [Option<Price>]) {
        if self.forward {
            let mut last = None;
            for cell in column.iter_mut() {
                if let Some(v) = *cell {
                    last = Some(v);
                } else {
                    *cell = last;
                }
            }
        }
        if self.backward {
            let mut next = None;
            for cell in column.iter_mut().rev() {
                if let Some(v) = *cell {
                    next = Some(v);
                } else {
                    *cell = next;
                }
            }
        }
    }
}

/// Build a `PriceTable` from columns that may contain gaps.
///
/// Each column is filled according to `policy`; rows still incomplete
/// afterwards are dropped. A column with no price at all is reported as
/// missing data rather than silently emptying the table.
pub fn align(
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<Price>>)>,
    policy: FillPolicy,
) -> Result<PriceTable> {
    if dates.is_empty() || columns.is_empty() {
        return Err(FolioError::empty_data("price alignment"));
    }

    let mut filled = Vec::with_capacity(columns.len());
    for (symbol, mut cells) in columns {
        if cells.len() != dates.len() {
            return Err(FolioError::length_mismatch(dates.len(), cells.len()));
        }
        if cells.iter().all(Option::is_none) {
            return Err(FolioError::missing_price(symbol, dates[0]));
        }
        let gaps = cells.iter().filter(|c| c.is_none()).count();
        policy.apply(&mut cells);
        if gaps > 0 {
            debug!(symbol = %symbol, gaps, "filled price gaps");
        }
        filled.push((symbol, cells));
    }

    let keep: Vec<usize> = (0..dates.len())
        .filter(|&i| filled.iter().all(|(_, c)| c[i].is_some()))
        .collect();
    let dropped = dates.len() - keep.len();
    if dropped > 0 {
        warn!(dropped, "dropped incomplete price rows after filling");
    }
    if keep.is_empty() {
        return Err(FolioError::empty_data("aligned price table"));
    }

    let kept_dates: Vec<NaiveDate> = keep.iter().map(|&i| dates[i]).collect();
    let kept_columns: Vec<(String, Vec<Price>)> = filled
        .into_iter()
        .map(|(symbol, cells)| {
            let prices: Vec<Price> = keep.iter().filter_map(|&i| cells[i]).collect();
            (symbol, prices)
        })
        .collect();
    PriceTable::from_columns(kept_dates, kept_columns)
}
