//! Date-indexed series used for portfolio values and returns.

use chrono::NaiveDate;

use super::error::{FolioError, Result};

/// A date-indexed series of values.
///
/// Dates are strictly ascending. The series is immutable once built; every
/// transformation returns a new series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    dates: Vec<NaiveDate>,
    values: Vec<T>,
}

impl<T: Clone> TimeSeries<T> {
    /// Create a new time series.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<T>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(FolioError::length_mismatch(dates.len(), values.len()));
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(FolioError::invalid_parameter(format!(
                "series dates must be strictly ascending ({} then {})",
                w[0], w[1]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Get the length.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dates of the series.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Values of the series.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Get value on a date.
    pub fn on(&self, date: NaiveDate) -> Option<&T> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| &self.values[i])
    }

    /// First value.
    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    /// Last value.
    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    /// Map values to a new type.
    pub fn map<U, F>(&self, f: F) -> TimeSeries<U>
    where
        F: Fn(&T) -> U,
    {
        TimeSeries {
            dates: self.dates.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl TimeSeries<f64> {
    /// Percentage change from the previous value.
    ///
    /// The result has one fewer element and is indexed by the later date of
    /// each pair. A zero divisor is an undefined return.
    pub fn pct_change(&self) -> Result<Self> {
        let mut values = Vec::with_capacity(self.values.len().saturating_sub(1));
        for (i, w) in self.values.windows(2).enumerate() {
            if w[0] == 0.0 {
                return Err(FolioError::undefined_statistic(
                    "daily return",
                    format!("value on {} is zero", self.dates[i]),
                ));
            }
            values.push(w[1] / w[0] - 1.0);
        }
        Ok(Self {
            dates: self.dates.iter().skip(1).copied().collect(),
            values,
        })
    }

    /// Divide every value by the first one.
    pub fn normalized(&self) -> Result<Self> {
        let first = *self
            .values
            .first()
            .ok_or_else(|| FolioError::empty_data("series normalization"))?;
        if first == 0.0 {
            return Err(FolioError::invalid_parameter(
                "cannot normalize a series starting at zero",
            ));
        }
        Ok(self.map(|v| v / first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2010, 3, 1).unwrap();
        start.iter_days().take(n).collect()
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let mut d = dates(3);
        d.swap(0, 1);
        assert!(TimeSeries::new(d, vec![1.0, 2.0, 3.0]).is_err());
        assert!(TimeSeries::new(dates(2), vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_pct_change() {
        let ts = TimeSeries::new(dates(3), vec![100.0, 110.0, 99.0]).unwrap();
        let pct = ts.pct_change().unwrap();
        assert_eq!(pct.len(), 2);
        assert_eq!(pct.dates()[0], ts.dates()[1]);
        assert!((pct.values()[0] - 0.1).abs() < 1e-10);
        assert!((pct.values()[1] - (-0.1)).abs() < 1e-10);
    }

    #[test]
    fn test_pct_change_zero_divisor() {
        let ts = TimeSeries::new(dates(3), vec![100.0, 0.0, 50.0]).unwrap();
        assert!(matches!(
            ts.pct_change(),
            Err(FolioError::UndefinedStatistic { .. })
        ));
    }

    #[test]
    fn test_normalized_and_lookup() {
        let d = dates(3);
        let ts = TimeSeries::new(d.clone(), vec![50.0, 55.0, 45.0]).unwrap();
        let n = ts.normalized().unwrap();
        assert!((n.values()[0] - 1.0).abs() < 1e-12);
        assert!((*n.on(d[2]).unwrap() - 0.9).abs() < 1e-12);
        assert!(n.on(d[2].succ_opt().unwrap()).is_none());
    }
}
