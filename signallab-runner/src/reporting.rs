//! Markdown reports for single securities, batches and follow-ups.

use std::fmt::Write as _;

use signallab_core::tracking::FollowUp;
use signallab_core::{AnalysisStatus, StatsTable};

use crate::batch::BatchReport;
use crate::runner::SecurityResult;

fn status_text(status: AnalysisStatus) -> &'static str {
    match status {
        AnalysisStatus::Complete => "complete",
        AnalysisStatus::InsufficientHistory => "insufficient history",
        AnalysisStatus::Stale => "stale (last bar is not on the reference date)",
        AnalysisStatus::NotReportWorthy => "not report-worthy (too few reliable signal types)",
    }
}

fn opt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

/// Per-type backtest table. With `fired_only`, types that never fired are
/// left out.
pub fn render_stats_table(stats: &StatsTable, fired_only: bool) -> String {
    let mut md = String::with_capacity(1024);
    md.push_str("| Signal | Label | Occurrences | Successes | Success Rate |\n");
    md.push_str("| --- | --- | ---: | ---: | ---: |\n");
    for entry in &stats.entries {
        if fired_only && entry.total_occurrences == 0 {
            continue;
        }
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {:.2}% |",
            entry.signal_type,
            entry.signal_type.label(),
            entry.total_occurrences,
            entry.success_count,
            entry.success_rate
        );
    }
    let _ = writeln!(
        md,
        "| **all** | | {} | {} | {:.2}% |",
        stats.total_signals, stats.total_success, stats.overall_success_rate
    );
    md
}

/// Markdown report for one security.
pub fn generate_report(result: &SecurityResult) -> String {
    let analysis = &result.analysis;
    let report = &analysis.report;
    let mut md = String::with_capacity(2048);

    let _ = writeln!(md, "# Signal Report: {}\n", result.symbol);

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Reference Date | {} |", result.as_of);
    let _ = writeln!(
        md,
        "| Period | {} to {} |",
        opt_date(result.first_date),
        opt_date(result.last_date)
    );
    let _ = writeln!(md, "| Bars | {} |", result.bar_count);
    if let Some(close) = result.last_close {
        let _ = writeln!(md, "| Last Close | {close:.2} |");
    }
    let _ = writeln!(md, "| Status | {} |", status_text(analysis.status));
    let _ = writeln!(md, "| Dataset Hash | {} |", result.dataset_hash);
    let _ = writeln!(md, "| Config | {} |", result.config_fingerprint);
    md.push('\n');

    if analysis.status == AnalysisStatus::InsufficientHistory {
        return md;
    }

    md.push_str("## Backtest Summary\n\n");
    let _ = writeln!(md, "- Overall success rate: {:.2}%", analysis.stats.overall_success_rate);
    let _ = writeln!(md, "- Total signals: {}", analysis.stats.total_signals);
    let _ = writeln!(md, "- Total successes: {}\n", analysis.stats.total_success);
    md.push_str(&render_stats_table(&analysis.stats, true));
    md.push('\n');

    if report.has_signals() {
        let groups = report.grouped();
        md.push_str("## Recent Reliable Signals\n\n");
        let _ = writeln!(
            md,
            "{} signals across {} types:\n",
            report.recent_signals.len(),
            groups.len()
        );
        for (signal_type, signals) in &groups {
            let _ = writeln!(md, "- {} ({}): {}", signal_type.label(), signal_type, signals.len());
        }
        md.push('\n');

        for signal in &report.recent_signals {
            let e = &signal.event;
            let _ = writeln!(
                md,
                "- {} {} | rate {:.2}% ({} occurrences) | overall {:.2}% | close {:.2} | {}",
                e.date,
                e.label,
                signal.type_success_rate,
                signal.type_occurrences,
                report.overall_success_rate,
                e.close,
                e.snapshot.describe()
            );
        }
        md.push('\n');
    } else if !analysis.recent_events.is_empty() {
        let _ = writeln!(
            md,
            "{} recent signals fired; none published.\n",
            analysis.recent_events.len()
        );
    }

    md
}

/// One-line-per-security overview of a batch.
pub fn generate_batch_summary(batch: &BatchReport) -> String {
    let mut md = String::with_capacity(1024);
    md.push_str("# Batch Summary\n\n");
    let _ = writeln!(
        md,
        "{} analysed, {} reported, {} stale, {} short, {} failed\n",
        batch.results.len(),
        batch.count_status(AnalysisStatus::Complete),
        batch.count_status(AnalysisStatus::Stale),
        batch.count_status(AnalysisStatus::InsufficientHistory),
        batch.failures.len()
    );

    md.push_str("| Symbol | Status | Overall Rate | Signals | Recent |\n");
    md.push_str("| --- | --- | ---: | ---: | ---: |\n");
    for r in &batch.results {
        let _ = writeln!(
            md,
            "| {} | {:?} | {:.2}% | {} | {} |",
            r.symbol,
            r.analysis.status,
            r.analysis.stats.overall_success_rate,
            r.analysis.stats.total_signals,
            r.analysis.report.recent_signals.len()
        );
    }

    if !batch.failures.is_empty() {
        md.push_str("\n## Failures\n\n");
        for f in &batch.failures {
            let _ = writeln!(md, "- {}: {}", f.symbol, f.error);
        }
    }
    md
}

/// Follow-up summary and daily path.
pub fn render_follow_up(symbol: &str, follow: &FollowUp) -> String {
    let mut md = String::with_capacity(1024);
    let _ = writeln!(md, "# Follow-up: {symbol}\n");
    let _ = writeln!(md, "- Signal date: {}", follow.signal_date);
    let _ = writeln!(md, "- Entry price: {:.2}", follow.entry_price);
    for (name, x) in [("Highest", &follow.highest), ("Lowest", &follow.lowest)] {
        let _ = writeln!(
            md,
            "- {name}: {:.2} on {} ({:+.2}%, {} days)",
            x.close, x.date, x.change_pct, x.days_from_signal
        );
    }
    if let Some(rate) = follow.buy_day_change_rate {
        let _ = writeln!(md, "- Buy-day change: {rate:+.2}%");
    }
    if let Some(rate) = follow.next_day_change_rate {
        let _ = writeln!(md, "- Next-day change: {rate:+.2}%");
    }

    md.push_str("\n| Day | Date | Open | High | Low | Close |\n");
    md.push_str("| ---: | --- | ---: | ---: | ---: | ---: |\n");
    for day in &follow.path {
        let _ = writeln!(
            md,
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            day.days_from_signal, day.date, day.open, day.high, day.low, day.close
        );
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use signallab_core::{Analysis, Report, SignalType};

    fn result(status: AnalysisStatus) -> SecurityResult {
        let mut stats = StatsTable::empty();
        let entry = &mut stats.entries[SignalType::CciOversold.ordinal()];
        entry.total_occurrences = 12;
        entry.success_count = 9;
        entry.success_rate = 75.0;
        stats.total_signals = 12;
        stats.total_success = 9;
        stats.overall_success_rate = 75.0;

        SecurityResult {
            schema_version: crate::runner::SCHEMA_VERSION,
            symbol: "sz000001".into(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            bar_count: 240,
            first_date: NaiveDate::from_ymd_opt(2023, 6, 7),
            last_date: NaiveDate::from_ymd_opt(2024, 6, 7),
            last_close: Some(11.2),
            dataset_hash: "abc".into(),
            config_fingerprint: "def".into(),
            analysis: Analysis {
                status,
                report: Report::empty(),
                stats,
                events: Vec::new(),
                recent_events: Vec::new(),
            },
        }
    }

    #[test]
    fn stats_table_lists_fired_types() {
        let r = result(AnalysisStatus::Complete);
        let table = render_stats_table(&r.analysis.stats, true);
        assert!(table.contains("cci_oversold"));
        assert!(table.contains("75.00%"));
        assert!(!table.contains("kdj_oversold"));

        let full = render_stats_table(&r.analysis.stats, false);
        assert_eq!(full.lines().count(), 2 + 18 + 1);
    }

    #[test]
    fn report_has_sections() {
        let md = generate_report(&result(AnalysisStatus::NotReportWorthy));
        assert!(md.contains("# Signal Report: sz000001"));
        assert!(md.contains("## Metadata"));
        assert!(md.contains("## Backtest Summary"));
        assert!(md.contains("not report-worthy"));
        assert!(!md.contains("## Recent Reliable Signals"));
    }

    #[test]
    fn short_history_report_stops_after_metadata() {
        let md = generate_report(&result(AnalysisStatus::InsufficientHistory));
        assert!(!md.contains("## Backtest Summary"));
    }

    #[test]
    fn batch_summary_counts() {
        let batch = BatchReport {
            results: vec![result(AnalysisStatus::Stale)],
            failures: vec![crate::batch::BatchFailure {
                symbol: "bad".into(),
                error: "boom".into(),
            }],
        };
        let md = generate_batch_summary(&batch);
        assert!(md.contains("1 analysed, 0 reported, 1 stale, 0 short, 1 failed"));
        assert!(md.contains("- bad: boom"));
    }
}
