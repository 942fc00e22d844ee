//! Export: JSON results and the CSV signal ledger.
//!
//! - **JSON**: full round-trip serialization with schema versioning. Unknown
//!   (newer) versions are rejected on load.
//! - **CSV**: one `SignalRecord` per published signal. The ledger is keyed by
//!   `(symbol, date, signal_type)`, so re-running a day never duplicates rows.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use signallab_core::SignalType;

use crate::batch::BatchReport;
use crate::runner::{SecurityResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SecurityResult` to pretty JSON.
pub fn export_json(result: &SecurityResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize SecurityResult to JSON")
}

/// Deserialize a `SecurityResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SecurityResult> {
    let result: SecurityResult =
        serde_json::from_str(json).context("failed to deserialize SecurityResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Serialize a whole batch to pretty JSON.
pub fn export_batch_json(batch: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(batch).context("failed to serialize BatchReport to JSON")
}

// ─── Signal ledger ──────────────────────────────────────────────────

/// One published signal, as persisted in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal_type: SignalType,
    pub label: String,
    pub close: f64,
    pub type_success_rate: f64,
    pub type_occurrences: u32,
    pub overall_success_rate: f64,
    /// Reference date of the run that published the signal.
    pub run_date: NaiveDate,
}

impl SignalRecord {
    pub fn key(&self) -> (String, NaiveDate, SignalType) {
        (self.symbol.clone(), self.date, self.signal_type)
    }
}

/// Records for every published signal of `result`.
pub fn signal_records(result: &SecurityResult) -> Vec<SignalRecord> {
    let report = &result.analysis.report;
    report
        .recent_signals
        .iter()
        .map(|s| SignalRecord {
            symbol: result.symbol.clone(),
            date: s.event.date,
            signal_type: s.event.signal_type,
            label: s.event.label.clone(),
            close: (s.event.close * 100.0).round() / 100.0,
            type_success_rate: s.type_success_rate,
            type_occurrences: s.type_occurrences,
            overall_success_rate: report.overall_success_rate,
            run_date: result.as_of,
        })
        .collect()
}

/// Serialize records as CSV with a header row.
pub fn export_signal_records_csv(records: &[SignalRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Read a ledger written by `export_signal_records_csv`.
pub fn read_signal_records(path: &Path) -> Result<Vec<SignalRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<SignalRecord>, _>>()
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Merge `records` into the ledger at `path`, creating it if needed.
///
/// Existing rows win on key collisions. The file is rewritten sorted by key.
/// Returns the number of rows actually added.
pub fn append_signal_records(path: &Path, records: &[SignalRecord]) -> Result<usize> {
    let mut ledger: BTreeMap<(String, NaiveDate, SignalType), SignalRecord> = BTreeMap::new();
    if path.exists() {
        for record in read_signal_records(path)? {
            ledger.insert(record.key(), record);
        }
    }

    let before = ledger.len();
    for record in records {
        ledger.entry(record.key()).or_insert_with(|| record.clone());
    }
    let added = ledger.len() - before;

    let rows: Vec<SignalRecord> = ledger.into_values().collect();
    let csv = export_signal_records_csv(&rows)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(added)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save `{symbol}.json` and `{symbol}.md` under `output_dir`.
///
/// Returns the path of the JSON file.
pub fn save_artifacts(result: &SecurityResult, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let json_path = output_dir.join(format!("{}.json", result.symbol));
    std::fs::write(&json_path, export_json(result)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let md_path = output_dir.join(format!("{}.md", result.symbol));
    std::fs::write(&md_path, crate::reporting::generate_report(result))
        .with_context(|| format!("failed to write {}", md_path.display()))?;

    Ok(json_path)
}

/// Load a result saved by `save_artifacts`.
pub fn load_artifacts(path: &Path) -> Result<SecurityResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
