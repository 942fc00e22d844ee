//! Analysis configuration.
//!
//! Every section has the production defaults, and every field is
//! `#[serde(default)]`, so a TOML file only needs to name what it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating an `AnalysisConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// ─── Indicator parameters ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdjParams {
    pub period: usize,
    pub signal: usize,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self { period: 9, signal: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollParams {
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

/// A set of look-back periods (RSI, SMA, EMA, WMA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSet {
    pub periods: Vec<usize>,
}

impl PeriodSet {
    pub fn new(periods: &[usize]) -> Self {
        Self {
            periods: periods.to_vec(),
        }
    }

    fn ma_default() -> Self {
        Self::new(&[5, 10, 20, 30, 60])
    }

    pub fn contains(&self, period: usize) -> bool {
        self.periods.contains(&period)
    }
}

impl Default for PeriodSet {
    fn default() -> Self {
        Self::ma_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthParam {
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmiParams {
    pub length: usize,
    /// ADX smoothing length.
    pub signal: usize,
}

impl Default for DmiParams {
    fn default() -> Self {
        Self {
            length: 14,
            signal: 14,
        }
    }
}

fn rsi_default() -> PeriodSet {
    PeriodSet::new(&[6, 12, 24])
}

fn atr_default() -> LengthParam {
    LengthParam { length: 14 }
}

fn cci_default() -> LengthParam {
    LengthParam { length: 20 }
}

fn roc_default() -> LengthParam {
    LengthParam { length: 12 }
}

impl Default for LengthParam {
    fn default() -> Self {
        Self { length: 14 }
    }
}

/// Window parameters for every indicator family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub kdj: KdjParams,
    pub macd: MacdParams,
    #[serde(default = "rsi_default")]
    pub rsi: PeriodSet,
    pub boll: BollParams,
    pub ma: PeriodSet,
    pub ema: PeriodSet,
    pub wma: PeriodSet,
    #[serde(default = "atr_default")]
    pub atr: LengthParam,
    pub dmi: DmiParams,
    #[serde(default = "cci_default")]
    pub cci: LengthParam,
    #[serde(default = "roc_default")]
    pub roc: LengthParam,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            kdj: KdjParams::default(),
            macd: MacdParams::default(),
            rsi: rsi_default(),
            boll: BollParams::default(),
            ma: PeriodSet::ma_default(),
            ema: PeriodSet::ma_default(),
            wma: PeriodSet::ma_default(),
            atr: atr_default(),
            dmi: DmiParams::default(),
            cci: cci_default(),
            roc: roc_default(),
        }
    }
}

// ─── Signal, backtest and filter parameters ─────────────────────────

/// Which computed columns the predicates read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Number of preceding bars compared by the divergence predicates.
    pub divergence_lookback: usize,
    pub rsi_fast: usize,
    pub rsi_slow: usize,
    pub ma_fast: usize,
    pub ma_slow: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            divergence_lookback: 5,
            rsi_fast: 6,
            rsi_slow: 12,
            ma_fast: 5,
            ma_slow: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Bars after the signal day searched for the maximum close.
    pub forward_window: usize,
    /// Minimum max-forward return, in percent, for a signal to count as a success.
    pub success_threshold_pct: f64,
    /// Trailing bars excluded from the backtest range.
    pub reserved_tail: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            forward_window: 14,
            success_threshold_pct: 5.0,
            reserved_tail: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of most recent trading days re-evaluated for the report.
    pub recent_days: usize,
    /// A type's historical count must be strictly greater than this.
    pub min_occurrences: u32,
    /// Percent, inclusive.
    pub min_type_success_rate: f64,
    /// Percent, inclusive.
    pub min_overall_success_rate: f64,
    /// Retained events must span strictly more distinct types than this.
    pub min_distinct_types: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            recent_days: 3,
            min_occurrences: 8,
            min_type_success_rate: 60.0,
            min_overall_success_rate: 50.0,
            min_distinct_types: 5,
        }
    }
}

/// Complete configuration for one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Series shorter than this produce an empty report.
    pub min_history: usize,
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub backtest: BacktestConfig,
    pub filter: FilterConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_history: 16,
            indicators: IndicatorConfig::default(),
            signals: SignalConfig::default(),
            backtest: BacktestConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic BLAKE3 digest of the canonical JSON form.
    ///
    /// Two analyses with the same fingerprint over the same dataset hash
    /// produce identical output.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;

        let windows: [(&'static str, usize); 11] = [
            ("indicators.kdj.period", ind.kdj.period),
            ("indicators.kdj.signal", ind.kdj.signal),
            ("indicators.macd.fast", ind.macd.fast),
            ("indicators.macd.slow", ind.macd.slow),
            ("indicators.macd.signal", ind.macd.signal),
            ("indicators.boll.period", ind.boll.period),
            ("indicators.atr.length", ind.atr.length),
            ("indicators.dmi.length", ind.dmi.length),
            ("indicators.dmi.signal", ind.dmi.signal),
            ("indicators.cci.length", ind.cci.length),
            ("indicators.roc.length", ind.roc.length),
        ];
        for (field, value) in windows {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be >= 1"));
            }
        }

        for (field, set) in [
            ("indicators.rsi.periods", &ind.rsi),
            ("indicators.ma.periods", &ind.ma),
            ("indicators.ema.periods", &ind.ema),
            ("indicators.wma.periods", &ind.wma),
        ] {
            if set.periods.iter().any(|&p| p == 0) {
                return Err(ConfigError::invalid(field, "periods must be >= 1"));
            }
        }

        if ind.macd.fast >= ind.macd.slow {
            return Err(ConfigError::invalid(
                "indicators.macd.fast",
                format!("({}) must be below slow ({})", ind.macd.fast, ind.macd.slow),
            ));
        }
        if !ind.boll.std_dev.is_finite() || ind.boll.std_dev <= 0.0 {
            return Err(ConfigError::invalid(
                "indicators.boll.std_dev",
                "must be finite and positive",
            ));
        }

        let sig = &self.signals;
        if sig.divergence_lookback == 0 {
            return Err(ConfigError::invalid("signals.divergence_lookback", "must be >= 1"));
        }
        for (field, period) in [("signals.rsi_fast", sig.rsi_fast), ("signals.rsi_slow", sig.rsi_slow)] {
            if !ind.rsi.contains(period) {
                return Err(ConfigError::invalid(
                    field,
                    format!("RSI({period}) is not among indicators.rsi.periods"),
                ));
            }
        }
        for (field, period) in [("signals.ma_fast", sig.ma_fast), ("signals.ma_slow", sig.ma_slow)] {
            if !ind.ma.contains(period) {
                return Err(ConfigError::invalid(
                    field,
                    format!("SMA({period}) is not among indicators.ma.periods"),
                ));
            }
        }

        let bt = &self.backtest;
        if bt.forward_window == 0 {
            return Err(ConfigError::invalid("backtest.forward_window", "must be >= 1"));
        }
        if bt.reserved_tail < bt.forward_window + 1 {
            return Err(ConfigError::invalid(
                "backtest.reserved_tail",
                format!(
                    "({}) must leave a full forward window of {} bars",
                    bt.reserved_tail, bt.forward_window
                ),
            ));
        }
        if !bt.success_threshold_pct.is_finite() {
            return Err(ConfigError::invalid("backtest.success_threshold_pct", "must be finite"));
        }

        let f = &self.filter;
        if f.recent_days == 0 {
            return Err(ConfigError::invalid("filter.recent_days", "must be >= 1"));
        }
        if !f.min_type_success_rate.is_finite() || !f.min_overall_success_rate.is_finite() {
            return Err(ConfigError::invalid("filter", "success-rate thresholds must be finite"));
        }

        Ok(())
    }
}
