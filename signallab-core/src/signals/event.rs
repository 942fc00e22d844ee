//! Signal events: immutable records of a predicate firing on a day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::kind::SignalType;
use super::snapshot::IndicatorSnapshot;

/// Forward-looking result of a backtested signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardOutcome {
    /// Highest close over the forward window; `None` if the window has no
    /// usable close.
    pub max_forward_close: Option<f64>,
    /// (max_forward_close - close) / close * 100.
    pub max_forward_return_pct: Option<f64>,
    pub success: bool,
}

/// A fired signal on one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub date: NaiveDate,
    /// Index of the bar in the analysed series.
    pub index: usize,
    pub signal_type: SignalType,
    pub label: String,
    pub close: f64,
    pub snapshot: IndicatorSnapshot,
    /// Present for backtested events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ForwardOutcome>,
}

impl SignalEvent {
    pub fn new(
        date: NaiveDate,
        index: usize,
        signal_type: SignalType,
        close: f64,
        snapshot: IndicatorSnapshot,
    ) -> Self {
        Self {
            date,
            index,
            signal_type,
            label: signal_type.label().to_string(),
            close,
            snapshot,
            outcome: None,
        }
    }

    pub fn with_outcome(mut self, outcome: ForwardOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// True only for backtested events whose outcome succeeded.
    pub fn succeeded(&self) -> bool {
        self.outcome.map(|o| o.success).unwrap_or(false)
    }
}
