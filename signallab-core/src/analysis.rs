//! SignalAnalyzer: one security's full pipeline:
//! frame → backtest → recent filter → report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backtest::{Backtester, StatsTable};
use crate::config::{AnalysisConfig, ConfigError};
use crate::domain::BarSeries;
use crate::frame::IndicatorEngine;
use crate::recent::RecentSignalFilter;
use crate::report::{Report, ReportAssembler};
use crate::signals::{SignalDetector, SignalEvent};

/// Why a report is (or is not) populated. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Recent signals were filtered and published.
    Complete,
    /// Fewer bars than `min_history`: nothing was computed.
    InsufficientHistory,
    /// The last bar is not dated on the reference date. Backtest statistics
    /// are still returned, the report is empty.
    Stale,
    /// Too few distinct reliable types fired recently; the report carries
    /// totals but no signals.
    NotReportWorthy,
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub status: AnalysisStatus,
    pub report: Report,
    pub stats: StatsTable,
    /// Scored backtest events.
    pub events: Vec<SignalEvent>,
    /// Signals fired on the recent trading days, before reliability filtering.
    pub recent_events: Vec<SignalEvent>,
}

impl Analysis {
    fn short_circuit(status: AnalysisStatus) -> Self {
        Self {
            status,
            report: Report::empty(),
            stats: StatsTable::empty(),
            events: Vec::new(),
            recent_events: Vec::new(),
        }
    }
}

/// Stateless across calls; safe to share between threads.
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    config: AnalysisConfig,
    engine: IndicatorEngine,
    backtester: Backtester,
    filter: RecentSignalFilter,
}

impl SignalAnalyzer {
    /// Validate `config`, then build the analyzer.
    pub fn try_new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Build without validation.
    ///
    /// # Panics
    /// If `config` has a zero indicator window. Use `try_new` for configs
    /// that have not passed `AnalysisConfig::validate`.
    pub fn new(config: AnalysisConfig) -> Self {
        let detector = SignalDetector::new(config.signals.clone());
        Self {
            engine: IndicatorEngine::new(config.indicators.clone()),
            backtester: Backtester::new(detector.clone(), config.backtest.clone()),
            filter: RecentSignalFilter::new(detector, config.filter.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Backtest statistics only, without the freshness guard or recent filter.
    pub fn backtest(&self, series: &BarSeries) -> Analysis {
        if series.len() < self.config.min_history {
            return Analysis::short_circuit(AnalysisStatus::InsufficientHistory);
        }
        let frame = self.engine.compute(series);
        let outcome = self.backtester.run(series, &frame);
        Analysis {
            status: AnalysisStatus::Complete,
            report: ReportAssembler::assemble(&outcome.stats, &[], false),
            stats: outcome.stats,
            events: outcome.events,
            recent_events: Vec::new(),
        }
    }

    /// Full analysis against the reference date `as_of`.
    pub fn analyze(&self, series: &BarSeries, as_of: NaiveDate) -> Analysis {
        let symbol = series.symbol();

        if series.len() < self.config.min_history {
            debug!(
                symbol,
                bars = series.len(),
                min_history = self.config.min_history,
                "insufficient history"
            );
            return Analysis::short_circuit(AnalysisStatus::InsufficientHistory);
        }

        let frame = self.engine.compute(series);
        let outcome = self.backtester.run(series, &frame);
        debug!(
            symbol,
            total = outcome.stats.total_signals,
            success = outcome.stats.total_success,
            overall_rate = outcome.stats.overall_success_rate,
            "backtest complete"
        );

        let last_date = series.last().map(|b| b.date);
        if last_date != Some(as_of) {
            debug!(symbol, ?last_date, %as_of, "stale series, report suppressed");
            return Analysis {
                status: AnalysisStatus::Stale,
                report: Report::empty(),
                stats: outcome.stats,
                events: outcome.events,
                recent_events: Vec::new(),
            };
        }

        let selection = self.filter.select(series, &frame, &outcome.stats);
        let report =
            ReportAssembler::assemble(&outcome.stats, &selection.retained, selection.report_worthy);
        let status = if selection.report_worthy {
            AnalysisStatus::Complete
        } else {
            AnalysisStatus::NotReportWorthy
        };
        debug!(
            symbol,
            fired = selection.fired.len(),
            retained = selection.retained.len(),
            distinct = selection.distinct_types,
            ?status,
            "recent signals filtered"
        );

        Analysis {
            status,
            report,
            stats: outcome.stats,
            events: outcome.events,
            recent_events: selection.fired,
        }
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Analyze with the given configuration.
///
/// # Panics
/// Same as `SignalAnalyzer::new` for an unvalidated config.
pub fn analyze(series: &BarSeries, config: &AnalysisConfig, as_of: NaiveDate) -> Analysis {
    SignalAnalyzer::new(config.clone()).analyze(series, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_zero_window() {
        let mut config = AnalysisConfig::default();
        config.indicators.atr.length = 0;
        let err = SignalAnalyzer::try_new(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn try_new_accepts_defaults() {
        let analyzer = SignalAnalyzer::try_new(AnalysisConfig::default()).unwrap();
        assert_eq!(analyzer.config(), &AnalysisConfig::default());
    }
}
