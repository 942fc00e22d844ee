//! Backtester: replays history, scores every fired signal, aggregates
//! per-type hit rates.
//!
//! Day `i` is scored against the `forward_window` closes strictly after it.
//! The last `reserved_tail` bars are never signal days, so every scored
//! signal has a complete forward window.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::BacktestConfig;
use crate::domain::BarSeries;
use crate::frame::IndicatorFrame;
use crate::signals::{ForwardOutcome, SignalDetector, SignalEvent, SignalType};

/// Round to two decimals, the precision every published rate uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of successes, rounded to two decimals; 0 when `total` is 0.
pub fn success_rate(success: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(success as f64 / total as f64 * 100.0)
    }
}

/// Historical record of one signal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTypeStats {
    pub signal_type: SignalType,
    pub total_occurrences: u32,
    pub success_count: u32,
    /// Percent, 0–100.
    pub success_rate: f64,
}

impl SignalTypeStats {
    fn empty(signal_type: SignalType) -> Self {
        Self {
            signal_type,
            total_occurrences: 0,
            success_count: 0,
            success_rate: 0.0,
        }
    }
}

/// Stats for all 18 types in catalogue order, plus the combined totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    pub entries: Vec<SignalTypeStats>,
    pub total_signals: u32,
    pub total_success: u32,
    /// Percent, 0–100.
    pub overall_success_rate: f64,
}

impl StatsTable {
    /// Table with every type at zero.
    pub fn empty() -> Self {
        Self {
            entries: SignalType::ALL.into_iter().map(SignalTypeStats::empty).collect(),
            total_signals: 0,
            total_success: 0,
            overall_success_rate: 0.0,
        }
    }

    /// Aggregate scored events. Unscored events count as failures.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a SignalEvent>) -> Self {
        let mut table = Self::empty();
        for event in events {
            let entry = &mut table.entries[event.signal_type.ordinal()];
            entry.total_occurrences += 1;
            table.total_signals += 1;
            if event.succeeded() {
                entry.success_count += 1;
                table.total_success += 1;
            }
        }
        for entry in &mut table.entries {
            entry.success_rate = success_rate(entry.success_count, entry.total_occurrences);
        }
        table.overall_success_rate = success_rate(table.total_success, table.total_signals);
        table
    }

    pub fn get(&self, signal_type: SignalType) -> &SignalTypeStats {
        &self.entries[signal_type.ordinal()]
    }

    /// Types that fired at least once.
    pub fn fired(&self) -> impl Iterator<Item = &SignalTypeStats> {
        self.entries.iter().filter(|e| e.total_occurrences > 0)
    }
}

impl Default for StatsTable {
    fn default() -> Self {
        Self::empty()
    }
}

/// Scored events and their aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub stats: StatsTable,
    /// Ordered by day, then catalogue order.
    pub events: Vec<SignalEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct Backtester {
    detector: SignalDetector,
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(detector: SignalDetector, config: BacktestConfig) -> Self {
        Self { detector, config }
    }

    /// Signal days scored for a series of `len` bars.
    ///
    /// Starts at 1 so every day has a prior bar; empty when the series is
    /// not longer than `reserved_tail + 1`.
    pub fn scored_range(&self, len: usize) -> Range<usize> {
        1..len.saturating_sub(self.config.reserved_tail).max(1)
    }

    pub fn run(&self, series: &BarSeries, frame: &IndicatorFrame) -> BacktestOutcome {
        let closes = series.closes();
        let mut events = Vec::new();

        for i in self.scored_range(series.len()) {
            let outcome = self.forward_outcome(&closes, i);
            events.extend(
                self.detector
                    .detect(series, frame, i, Some(i - 1))
                    .into_iter()
                    .map(|e| e.with_outcome(outcome)),
            );
        }

        let stats = StatsTable::from_events(&events);
        BacktestOutcome { stats, events }
    }

    /// Score a signal on `index` against the following `forward_window` closes.
    ///
    /// The window never includes `index` itself. A non-positive or missing
    /// signal-day close, or a window without any finite close, is a failure.
    pub fn forward_outcome(&self, closes: &[f64], index: usize) -> ForwardOutcome {
        let start = (index + 1).min(closes.len());
        let end = (index + 1 + self.config.forward_window).min(closes.len());
        let max_forward_close = closes[start..end]
            .iter()
            .copied()
            .filter(|c| c.is_finite())
            .reduce(f64::max);

        let close = closes.get(index).copied().unwrap_or(f64::NAN);
        let max_forward_return_pct = match max_forward_close {
            Some(max) if close.is_finite() && close > 0.0 => Some((max - close) / close * 100.0),
            _ => None,
        };
        let success = max_forward_return_pct
            .map(|r| r >= self.config.success_threshold_pct)
            .unwrap_or(false);

        ForwardOutcome {
            max_forward_close,
            max_forward_return_pct,
            success,
        }
    }
}
