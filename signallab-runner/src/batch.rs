//! Batch runner: analyses many independent securities, optionally in
//! parallel.
//!
//! One security failing to load never aborts the batch: the failure is
//! recorded and the rest continue. An invalid config is fatal up front.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use signallab_core::{AnalysisConfig, AnalysisStatus, SignalAnalyzer};

use crate::data_loader::{discover_csv, load_csv};
use crate::runner::{run_with_analyzer, RunError, SecurityResult};

/// One security to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub symbol: String,
    pub path: PathBuf,
}

impl BatchJob {
    pub fn new(symbol: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            symbol: symbol.into(),
            path: path.into(),
        }
    }
}

/// Jobs for every `*.csv` file in `dir`, symbol taken from the file stem.
pub fn jobs_from_dir(dir: &Path) -> Result<Vec<BatchJob>, RunError> {
    Ok(discover_csv(dir)?
        .into_iter()
        .map(|(symbol, path)| BatchJob::new(symbol, path))
        .collect())
}

/// A security that could not be analysed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub symbol: String,
    pub error: String,
}

/// Results of a batch, each list sorted by symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<SecurityResult>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Securities whose report carries published signals.
    pub fn reported(&self) -> impl Iterator<Item = &SecurityResult> {
        self.results
            .iter()
            .filter(|r| r.analysis.status == AnalysisStatus::Complete)
    }

    /// Number of results with the given status.
    pub fn count_status(&self, status: AnalysisStatus) -> usize {
        self.results
            .iter()
            .filter(|r| r.analysis.status == status)
            .count()
    }
}

/// Run every job. See `run_batch_with_progress`.
pub fn run_batch(
    jobs: &[BatchJob],
    config: &AnalysisConfig,
    as_of: NaiveDate,
    parallel: bool,
) -> Result<BatchReport, RunError> {
    run_batch_with_progress(jobs, config, as_of, parallel, |_, _, _| {})
}

/// Run every job, calling `progress(done, total, symbol)` after each one.
///
/// With `parallel`, jobs run on the rayon pool and `done` counts completions
/// rather than job positions.
pub fn run_batch_with_progress<F>(
    jobs: &[BatchJob],
    config: &AnalysisConfig,
    as_of: NaiveDate,
    parallel: bool,
    progress: F,
) -> Result<BatchReport, RunError>
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    let analyzer = SignalAnalyzer::try_new(config.clone())?;
    let total = jobs.len();
    let done = std::sync::atomic::AtomicUsize::new(0);

    let run_one = |job: &BatchJob| {
        let outcome = load_csv(&job.path, &job.symbol)
            .map(|series| run_with_analyzer(&analyzer, &series, as_of))
            .map_err(|e| {
                warn!(symbol = %job.symbol, error = %e, "security skipped");
                BatchFailure {
                    symbol: job.symbol.clone(),
                    error: e.to_string(),
                }
            });
        let n = done.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
        progress(n, total, &job.symbol);
        outcome
    };

    let outcomes: Vec<Result<SecurityResult, BatchFailure>> = if parallel {
        jobs.par_iter().map(run_one).collect()
    } else {
        jobs.iter().map(run_one).collect()
    };

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(failure) => report.failures.push(failure),
        }
    }
    report.results.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    report.failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    info!(
        total,
        analysed = report.results.len(),
        failed = report.failures.len(),
        reported = report.count_status(AnalysisStatus::Complete),
        "batch complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn write_csv(dir: &Path, symbol: &str, n: usize) -> PathBuf {
        let mut content = String::from("date,open,high,low,close,volume\n");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..n {
            let c = 10.0 + (i as f64 * 0.4).sin();
            let date = start + chrono::Duration::days(i as i64);
            content.push_str(&format!("{date},{c},{},{},{c},1000\n", c + 0.1, c - 0.1));
        }
        let path = dir.join(format!("{symbol}.csv"));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let dir = tempfile::tempdir().unwrap();
        for symbol in ["sz000003", "sh600001", "sz000001"] {
            write_csv(dir.path(), symbol, 50);
        }
        let jobs = jobs_from_dir(dir.path()).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 2, 19).unwrap();
        let config = AnalysisConfig::default();

        let par = run_batch(&jobs, &config, as_of, true).unwrap();
        let seq = run_batch(&jobs, &config, as_of, false).unwrap();
        assert_eq!(par, seq);

        let symbols: Vec<_> = par.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["sh600001", "sz000001", "sz000003"]);
    }

    #[test]
    fn failures_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "good", 30);
        std::fs::write(dir.path().join("bad.csv"), "date,open\nnot-a-date,1\n").unwrap();

        let jobs = jobs_from_dir(dir.path()).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let report = run_batch(&jobs, &AnalysisConfig::default(), as_of, true).unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol, "bad");
    }

    #[test]
    fn progress_reports_every_job() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "a", 20);
        write_csv(dir.path(), "b", 20);
        let jobs = jobs_from_dir(dir.path()).unwrap();
        let seen = Mutex::new(Vec::new());

        run_batch_with_progress(
            &jobs,
            &AnalysisConfig::default(),
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            false,
            |done, total, symbol| seen.lock().unwrap().push((done, total, symbol.to_string())),
        )
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![(1, 2, "a".to_string()), (2, 2, "b".to_string())]);
    }

    #[test]
    fn invalid_config_fails_before_any_job() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "a", 20);
        let jobs = jobs_from_dir(dir.path()).unwrap();
        let mut config = AnalysisConfig::default();
        config.indicators.rsi.periods = vec![0, 6, 12];

        let err = run_batch(&jobs, &config, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(), true)
            .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }
}
