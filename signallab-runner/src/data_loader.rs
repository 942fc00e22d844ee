//! Bar ingestion for the runner.
//!
//! Two input shapes are supported:
//! 1. Headered CSV files (`date,open,high,low,close,volume` plus the optional
//!    `amount,turnover,change_rate` columns), one security per file.
//! 2. Vendor kline strings: `date,open,close,high,low,volume,amount,amplitude,
//!    change_rate,change_amount,turnover`. Note close comes before high/low.
//!
//! Rows are sorted by date. Duplicate dates are rejected. Unparseable price
//! fields become NaN so the bar stays in the series as a void bar.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use signallab_core::domain::{Bar, BarSeries, SeriesError};
use thiserror::Error;
use tracing::debug;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("kline line {line}: {reason}")]
    MalformedKline { line: usize, reason: String },

    #[error("no bars for '{symbol}'")]
    Empty { symbol: String },

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    turnover: Option<f64>,
    #[serde(default)]
    change_rate: Option<f64>,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        let or_nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
        let mut bar = Bar::new(
            row.date,
            or_nan(row.open),
            or_nan(row.high),
            or_nan(row.low),
            or_nan(row.close),
            or_nan(row.volume),
        );
        bar.amount = row.amount;
        bar.turnover = row.turnover;
        bar.change_rate = row.change_rate;
        bar
    }
}

/// Load one security from a headered CSV file.
pub fn load_csv(path: &Path, symbol: &str) -> Result<BarSeries, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let bars = reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(Bar::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(symbol, path = %path.display(), bars = bars.len(), "loaded CSV");
    into_series(symbol, bars)
}

/// Parse vendor kline strings into a series. Blank lines are skipped.
pub fn parse_kline_lines<I, S>(symbol: &str, lines: I) -> Result<BarSeries, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut bars = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        bars.push(parse_kline(line, idx + 1)?);
    }
    into_series(symbol, bars)
}

fn parse_kline(line: &str, line_no: usize) -> Result<Bar, LoadError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(LoadError::MalformedKline {
            line: line_no,
            reason: format!("expected at least 6 fields, found {}", fields.len()),
        });
    }

    let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(fields[0], "%Y%m%d"))
        .map_err(|e| LoadError::MalformedKline {
            line: line_no,
            reason: format!("bad date '{}': {e}", fields[0]),
        })?;

    let num = |i: usize| fields.get(i).and_then(|s| s.parse::<f64>().ok());
    let price = |i: usize| num(i).unwrap_or(f64::NAN);

    let mut bar = Bar::new(date, price(1), price(3), price(4), price(2), price(5));
    bar.amount = num(6);
    bar.change_rate = num(8);
    bar.turnover = num(10);
    Ok(bar)
}

fn into_series(symbol: &str, bars: Vec<Bar>) -> Result<BarSeries, LoadError> {
    if bars.is_empty() {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
        });
    }
    Ok(BarSeries::from_unsorted(symbol, bars)?)
}

/// `*.csv` files in `dir`, paired with their file stem as symbol, sorted by
/// symbol.
pub fn discover_csv(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((stem.to_string(), path.clone()));
        }
    }
    found.sort();
    Ok(found)
}

/// File stem of `path`, used as the default symbol.
pub fn symbol_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}
