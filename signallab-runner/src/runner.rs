//! Security runner: wires together loading, analysis and provenance.
//!
//! Two entry points:
//! - `run_security()`: analyses a pre-loaded series. No I/O.
//! - `run_csv()`: loads a CSV file first. Used by the CLI.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use signallab_core::config::{AnalysisConfig, ConfigError};
use signallab_core::domain::{BarSeries, SeriesError};
use signallab_core::{Analysis, SignalAnalyzer};

use crate::data_loader::{load_csv, symbol_from_path, LoadError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("cannot derive a symbol from '{0}'")]
    NoSymbol(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of analysing one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub as_of: NaiveDate,
    pub bar_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub last_close: Option<f64>,
    /// BLAKE3 over the bar data.
    pub dataset_hash: String,
    /// BLAKE3 over the canonical config.
    pub config_fingerprint: String,
    pub analysis: Analysis,
}

/// Default schema version for JSON written before the field existed.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Validate `config` and analyse `series` against `as_of`.
pub fn run_security(
    series: &BarSeries,
    config: &AnalysisConfig,
    as_of: NaiveDate,
) -> Result<SecurityResult, RunError> {
    let analyzer = SignalAnalyzer::try_new(config.clone())?;
    Ok(run_with_analyzer(&analyzer, series, as_of))
}

/// Analyse with an already-built analyzer. Used by the batch runner to avoid
/// rebuilding it per security.
pub fn run_with_analyzer(
    analyzer: &SignalAnalyzer,
    series: &BarSeries,
    as_of: NaiveDate,
) -> SecurityResult {
    let analysis = analyzer.analyze(series, as_of);
    info!(
        symbol = series.symbol(),
        bars = series.len(),
        status = ?analysis.status,
        recent = analysis.report.recent_signals.len(),
        "security analysed"
    );

    SecurityResult {
        schema_version: SCHEMA_VERSION,
        symbol: series.symbol().to_string(),
        as_of,
        bar_count: series.len(),
        first_date: series.first().map(|b| b.date),
        last_date: series.last().map(|b| b.date),
        last_close: series.last().map(|b| b.close).filter(|c| c.is_finite()),
        dataset_hash: series.dataset_hash(),
        config_fingerprint: analyzer.config().fingerprint(),
        analysis,
    }
}

/// Load `path` and run it. The symbol defaults to the file stem.
pub fn run_csv(
    path: &Path,
    symbol: Option<&str>,
    config: &AnalysisConfig,
    as_of: NaiveDate,
) -> Result<SecurityResult, RunError> {
    let series = load_series(path, symbol)?;
    run_security(&series, config, as_of)
}

/// Load `path` as a series, deriving the symbol from the file stem when
/// none is given.
pub fn load_series(path: &Path, symbol: Option<&str>) -> Result<BarSeries, RunError> {
    let symbol = match symbol {
        Some(s) => s.to_string(),
        None => symbol_from_path(path)
            .ok_or_else(|| RunError::NoSymbol(path.display().to_string()))?,
    };
    Ok(load_csv(path, &symbol)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signallab_core::domain::Bar;
    use signallab_core::AnalysisStatus;

    fn series(n: usize) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| {
                let c = 10.0 + (i as f64 * 0.3).sin();
                Bar::new(start + chrono::Duration::days(i as i64), c, c + 0.2, c - 0.2, c, 100.0)
            })
            .collect();
        BarSeries::new("sh600000", bars).unwrap()
    }

    #[test]
    fn records_provenance() {
        let s = series(60);
        let as_of = s.last().unwrap().date;
        let result = run_security(&s, &AnalysisConfig::default(), as_of).unwrap();

        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert_eq!(result.symbol, "sh600000");
        assert_eq!(result.bar_count, 60);
        assert_eq!(result.dataset_hash, s.dataset_hash());
        assert_eq!(result.config_fingerprint, AnalysisConfig::default().fingerprint());
        assert_eq!(result.last_date, Some(as_of));
    }

    #[test]
    fn invalid_config_is_error() {
        let mut config = AnalysisConfig::default();
        config.indicators.macd.fast = 30;
        let s = series(60);
        let err = run_security(&s, &config, s.last().unwrap().date).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn short_series_is_not_an_error() {
        let s = series(8);
        let result = run_security(&s, &AnalysisConfig::default(), s.last().unwrap().date).unwrap();
        assert_eq!(result.analysis.status, AnalysisStatus::InsufficientHistory);
    }
}
