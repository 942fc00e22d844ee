//! RecentSignalFilter: re-detects signals on the last few trading days and
//! keeps those whose type has proven reliable in the backtest.

use std::collections::BTreeSet;

use crate::backtest::StatsTable;
use crate::config::FilterConfig;
use crate::domain::BarSeries;
use crate::frame::IndicatorFrame;
use crate::signals::{SignalDetector, SignalEvent, SignalType};

/// What the filter saw and kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecentSelection {
    /// Every signal fired on a recent trading day.
    pub fired: Vec<SignalEvent>,
    /// Fired signals passing the reliability thresholds.
    pub retained: Vec<SignalEvent>,
    /// Distinct types among `retained`.
    pub distinct_types: usize,
    /// Strictly more than `min_distinct_types` distinct retained types.
    pub report_worthy: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecentSignalFilter {
    detector: SignalDetector,
    config: FilterConfig,
}

impl RecentSignalFilter {
    pub fn new(detector: SignalDetector, config: FilterConfig) -> Self {
        Self { detector, config }
    }

    /// The last `recent_days` trading days, each paired with the trading day
    /// before it (which may fall outside the window).
    ///
    /// Weekend-dated rows are never trading days and never serve as a prior.
    pub fn recent_days(&self, series: &BarSeries) -> Vec<(usize, Option<usize>)> {
        let trading = series.trading_day_indices();
        let first = trading.len().saturating_sub(self.config.recent_days);
        (first..trading.len())
            .map(|k| (trading[k], k.checked_sub(1).map(|p| trading[p])))
            .collect()
    }

    /// Whether a recent signal of `signal_type` may be published.
    pub fn passes(&self, signal_type: SignalType, stats: &StatsTable) -> bool {
        let entry = stats.get(signal_type);
        entry.total_occurrences > self.config.min_occurrences
            && entry.success_rate >= self.config.min_type_success_rate
            && stats.overall_success_rate >= self.config.min_overall_success_rate
    }

    pub fn select(
        &self,
        series: &BarSeries,
        frame: &IndicatorFrame,
        stats: &StatsTable,
    ) -> RecentSelection {
        let fired: Vec<SignalEvent> = self
            .recent_days(series)
            .into_iter()
            .flat_map(|(index, prior)| self.detector.detect(series, frame, index, prior))
            .collect();

        let retained: Vec<SignalEvent> = fired
            .iter()
            .filter(|e| self.passes(e.signal_type, stats))
            .cloned()
            .collect();

        let distinct_types = retained
            .iter()
            .map(|e| e.signal_type)
            .collect::<BTreeSet<_>>()
            .len();

        RecentSelection {
            fired,
            retained,
            distinct_types,
            report_worthy: distinct_types > self.config.min_distinct_types,
        }
    }
}
