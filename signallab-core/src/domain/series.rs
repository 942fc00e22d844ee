//! BarSeries: the ordered price history of one security.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bar;

/// Contract violations when building a `BarSeries`.
///
/// These are the only fatal errors at the core's API boundary. Data-quality
/// problems (short history, stale data, degenerate windows) are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("bars out of order at index {index}: {previous} is followed by {current}")]
    Unsorted {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("duplicate bar date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// Ascending, duplicate-free sequence of daily bars for one security.
///
/// Immutable once built; all analysis borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate ordering and build the series.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(SeriesError::EmptySymbol);
        }

        for (index, pair) in bars.windows(2).enumerate() {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(SeriesError::DuplicateDate {
                    index: index + 1,
                    date: current,
                });
            }
            if current < previous {
                return Err(SeriesError::Unsorted {
                    index: index + 1,
                    previous,
                    current,
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    /// Sort by date first, then validate. Duplicates are still rejected.
    pub fn from_unsorted(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, SeriesError> {
        bars.sort_by_key(|b| b.date);
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Index of the first bar dated on or after `date`.
    pub fn position_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.date < date);
        (idx < self.bars.len()).then_some(idx)
    }

    /// Indices of Monday–Friday bars, ascending.
    ///
    /// Weekend-tagged rows stay in the series (and in indicator warm-up) but
    /// are never treated as trading days.
    pub fn trading_day_indices(&self) -> Vec<usize> {
        self.bars
            .iter()
            .enumerate()
            .filter(|(_, b)| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|(i, _)| i)
            .collect()
    }

    /// BLAKE3 digest over the bar data, for provenance of stored reports.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
                hasher.update(&v.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}
