//! Per-family indicator snapshots attached to signal events.

use serde::{Deserialize, Serialize};

use super::kind::SignalFamily;
use crate::config::SignalConfig;
use crate::frame::{Column, IndicatorFrame};

/// The 1–3 indicator values that explain a signal, keyed by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum IndicatorSnapshot {
    Kdj {
        k: Option<f64>,
        d: Option<f64>,
        j: Option<f64>,
    },
    Macd {
        macd: Option<f64>,
        signal: Option<f64>,
    },
    Rsi {
        rsi_fast: Option<f64>,
        rsi_slow: Option<f64>,
    },
    Boll {
        lower: Option<f64>,
        middle: Option<f64>,
        upper: Option<f64>,
    },
    Ma {
        ma_fast: Option<f64>,
        ma_slow: Option<f64>,
    },
    Dmi {
        plus_di: Option<f64>,
        minus_di: Option<f64>,
        adx: Option<f64>,
    },
    Cci {
        cci: Option<f64>,
    },
    Roc {
        roc: Option<f64>,
    },
}

impl IndicatorSnapshot {
    /// Named values in display order.
    pub fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        match *self {
            Self::Kdj { k, d, j } => vec![("K", k), ("D", d), ("J", j)],
            Self::Macd { macd, signal } => vec![("MACD", macd), ("signal", signal)],
            Self::Rsi { rsi_fast, rsi_slow } => vec![("RSI_fast", rsi_fast), ("RSI_slow", rsi_slow)],
            Self::Boll { lower, middle, upper } => {
                vec![("lower", lower), ("middle", middle), ("upper", upper)]
            }
            Self::Ma { ma_fast, ma_slow } => vec![("MA_fast", ma_fast), ("MA_slow", ma_slow)],
            Self::Dmi { plus_di, minus_di, adx } => {
                vec![("DI+", plus_di), ("DI-", minus_di), ("ADX", adx)]
            }
            Self::Cci { cci } => vec![("CCI", cci)],
            Self::Roc { roc } => vec![("ROC", roc)],
        }
    }

    /// `K=12.34 D=15.00 J=6.02` style rendering; unavailable values print as `-`.
    pub fn describe(&self) -> String {
        self.values()
            .into_iter()
            .map(|(name, v)| match v {
                Some(v) => format!("{name}={v:.2}"),
                None => format!("{name}=-"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn at(column: Option<&Column>, index: usize) -> Option<f64> {
    column.and_then(|c| c.get(index))
}

impl SignalFamily {
    /// Read this family's snapshot values at `index`.
    pub fn snapshot(
        self,
        frame: &IndicatorFrame,
        index: usize,
        config: &SignalConfig,
    ) -> IndicatorSnapshot {
        match self {
            Self::Kdj => IndicatorSnapshot::Kdj {
                k: frame.kdj_k.get(index),
                d: frame.kdj_d.get(index),
                j: frame.kdj_j.get(index),
            },
            Self::Macd => IndicatorSnapshot::Macd {
                macd: frame.macd.get(index),
                signal: frame.macd_signal.get(index),
            },
            Self::Rsi => IndicatorSnapshot::Rsi {
                rsi_fast: at(frame.rsi.get(config.rsi_fast), index),
                rsi_slow: at(frame.rsi.get(config.rsi_slow), index),
            },
            Self::Boll => IndicatorSnapshot::Boll {
                lower: frame.boll_lower.get(index),
                middle: frame.boll_middle.get(index),
                upper: frame.boll_upper.get(index),
            },
            Self::Ma => IndicatorSnapshot::Ma {
                ma_fast: at(frame.sma.get(config.ma_fast), index),
                ma_slow: at(frame.sma.get(config.ma_slow), index),
            },
            Self::Dmi => IndicatorSnapshot::Dmi {
                plus_di: frame.dmi_plus.get(index),
                minus_di: frame.dmi_minus.get(index),
                adx: frame.adx.get(index),
            },
            Self::Cci => IndicatorSnapshot::Cci {
                cci: frame.cci.get(index),
            },
            Self::Roc => IndicatorSnapshot::Roc {
                roc: frame.roc.get(index),
            },
        }
    }
}
