//! Report: the externally consumed result of one analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::backtest::StatsTable;
use crate::signals::{SignalEvent, SignalType};

/// A retained recent signal annotated with its type's track record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSignal {
    #[serde(flatten)]
    pub event: SignalEvent,
    /// Percent, 0–100.
    pub type_success_rate: f64,
    pub type_occurrences: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Percent, 0–100.
    pub overall_success_rate: f64,
    pub total_signals: u32,
    pub total_success: u32,
    /// Ordered by date, then catalogue order.
    pub recent_signals: Vec<RecentSignal>,
}

impl Report {
    pub fn empty() -> Self {
        Self {
            overall_success_rate: 0.0,
            total_signals: 0,
            total_success: 0,
            recent_signals: Vec::new(),
        }
    }

    /// Recent signals grouped by type, in catalogue order.
    pub fn grouped(&self) -> BTreeMap<SignalType, Vec<&RecentSignal>> {
        let mut groups: BTreeMap<SignalType, Vec<&RecentSignal>> = BTreeMap::new();
        for signal in &self.recent_signals {
            groups.entry(signal.event.signal_type).or_default().push(signal);
        }
        groups
    }

    pub fn has_signals(&self) -> bool {
        !self.recent_signals.is_empty()
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builds a `Report` from backtest statistics and the retained recent events.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    /// `report_worthy = false` keeps the totals but publishes no signals.
    pub fn assemble(stats: &StatsTable, retained: &[SignalEvent], report_worthy: bool) -> Report {
        let recent_signals = if report_worthy {
            retained
                .iter()
                .map(|event| {
                    let entry = stats.get(event.signal_type);
                    RecentSignal {
                        event: event.clone(),
                        type_success_rate: entry.success_rate,
                        type_occurrences: entry.total_occurrences,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Report {
            overall_success_rate: stats.overall_success_rate,
            total_signals: stats.total_signals,
            total_success: stats.total_success,
            recent_signals,
        }
    }
}
