//! SignalLab Runner: ingestion, single and batch analysis, reports, export.
//!
//! This crate builds on `signallab-core` to provide:
//! - CSV and vendor kline ingestion into validated bar series
//! - Single-security runner with dataset and config provenance
//! - Parallel batch runner over a directory of securities
//! - Markdown reports and stats tables
//! - JSON export with schema versioning and an idempotent CSV signal ledger

pub mod batch;
pub mod data_loader;
pub mod export;
pub mod reporting;
pub mod runner;

pub use batch::{jobs_from_dir, run_batch, run_batch_with_progress, BatchFailure, BatchJob, BatchReport};
pub use data_loader::{load_csv, parse_kline_lines, LoadError};
pub use export::{append_signal_records, signal_records, SignalRecord};
pub use runner::{run_csv, run_security, RunError, SecurityResult, SCHEMA_VERSION};
