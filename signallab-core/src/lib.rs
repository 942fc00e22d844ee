//! SignalLab Core: indicators, signal predicates, backtest statistics and
//! recent-signal reporting for daily price histories.
//!
//! This crate is the pure part of the system:
//! - Domain types (bars, validated bar series)
//! - Indicator implementations and the fixed-schema `IndicatorFrame`
//! - The 18-signal catalogue and its detector
//! - Walk-forward backtest of per-type hit rates
//! - Recent-signal filtering and report assembly
//! - Follow-up tracking of published signals
//!
//! No I/O happens here; one call analyses one security to completion.

pub mod analysis;
pub mod backtest;
pub mod config;
pub mod domain;
pub mod frame;
pub mod indicators;
pub mod recent;
pub mod report;
pub mod signals;
pub mod tracking;

pub use analysis::{analyze, Analysis, AnalysisStatus, SignalAnalyzer};
pub use backtest::{BacktestOutcome, Backtester, SignalTypeStats, StatsTable};
pub use config::{AnalysisConfig, ConfigError};
pub use domain::{Bar, BarSeries, SeriesError};
pub use frame::{Column, IndicatorEngine, IndicatorFrame};
pub use report::{RecentSignal, Report, ReportAssembler};
pub use signals::{SignalDetector, SignalEvent, SignalFamily, SignalType};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a batch runner moves across threads is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<BarSeries>();
        require_sync::<BarSeries>();
        require_send::<AnalysisConfig>();
        require_sync::<AnalysisConfig>();

        require_send::<IndicatorFrame>();
        require_sync::<IndicatorFrame>();
        require_send::<IndicatorEngine>();
        require_sync::<IndicatorEngine>();

        require_send::<SignalEvent>();
        require_sync::<SignalEvent>();
        require_send::<StatsTable>();
        require_sync::<StatsTable>();
        require_send::<Report>();
        require_sync::<Report>();
        require_send::<Analysis>();
        require_sync::<Analysis>();

        require_send::<SignalAnalyzer>();
        require_sync::<SignalAnalyzer>();
        require_send::<tracking::FollowUp>();
        require_sync::<tracking::FollowUp>();
    }
}
