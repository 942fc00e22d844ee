//! The closed catalogue of signal types and their indicator families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Indicator family a signal type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFamily {
    Kdj,
    Macd,
    Rsi,
    Boll,
    Ma,
    Dmi,
    Cci,
    Roc,
}

impl SignalFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kdj => "kdj",
            Self::Macd => "macd",
            Self::Rsi => "rsi",
            Self::Boll => "boll",
            Self::Ma => "ma",
            Self::Dmi => "dmi",
            Self::Cci => "cci",
            Self::Roc => "roc",
        }
    }
}

/// One of the 18 bullish signal predicates.
///
/// Declaration order is the catalogue order used for statistics tables and
/// for ordering events that fire on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    KdjOversold,
    KdjGoldenCross,
    KdjDivergence,
    MacdGoldenCross,
    MacdZeroCross,
    MacdDivergence,
    RsiOversold,
    RsiGoldenCross,
    BollBottomTouch,
    BollWidthExpand,
    MaGoldenCross,
    MaSupport,
    DmiGoldenCross,
    DmiAdxStrong,
    CciOversold,
    CciZeroCross,
    RocZeroCross,
    RocDivergence,
}

impl SignalType {
    pub const ALL: [SignalType; 18] = [
        Self::KdjOversold,
        Self::KdjGoldenCross,
        Self::KdjDivergence,
        Self::MacdGoldenCross,
        Self::MacdZeroCross,
        Self::MacdDivergence,
        Self::RsiOversold,
        Self::RsiGoldenCross,
        Self::BollBottomTouch,
        Self::BollWidthExpand,
        Self::MaGoldenCross,
        Self::MaSupport,
        Self::DmiGoldenCross,
        Self::DmiAdxStrong,
        Self::CciOversold,
        Self::CciZeroCross,
        Self::RocZeroCross,
        Self::RocDivergence,
    ];

    /// Stable identifier, e.g. `kdj_golden_cross`.
    pub fn id(self) -> &'static str {
        match self {
            Self::KdjOversold => "kdj_oversold",
            Self::KdjGoldenCross => "kdj_golden_cross",
            Self::KdjDivergence => "kdj_divergence",
            Self::MacdGoldenCross => "macd_golden_cross",
            Self::MacdZeroCross => "macd_zero_cross",
            Self::MacdDivergence => "macd_divergence",
            Self::RsiOversold => "rsi_oversold",
            Self::RsiGoldenCross => "rsi_golden_cross",
            Self::BollBottomTouch => "boll_bottom_touch",
            Self::BollWidthExpand => "boll_width_expand",
            Self::MaGoldenCross => "ma_golden_cross",
            Self::MaSupport => "ma_support",
            Self::DmiGoldenCross => "dmi_golden_cross",
            Self::DmiAdxStrong => "dmi_adx_strong",
            Self::CciOversold => "cci_oversold",
            Self::CciZeroCross => "cci_zero_cross",
            Self::RocZeroCross => "roc_zero_cross",
            Self::RocDivergence => "roc_divergence",
        }
    }

    /// Display label shown in published reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::KdjOversold => "KDJ超卖",
            Self::KdjGoldenCross => "KDJ金叉",
            Self::KdjDivergence => "KDJ底背离",
            Self::MacdGoldenCross => "MACD金叉",
            Self::MacdZeroCross => "MACD零轴上穿",
            Self::MacdDivergence => "MACD底背离",
            Self::RsiOversold => "RSI超卖",
            Self::RsiGoldenCross => "RSI金叉",
            Self::BollBottomTouch => "BOLL下轨支撑",
            Self::BollWidthExpand => "BOLL带宽扩张",
            Self::MaGoldenCross => "MA5上穿MA20",
            Self::MaSupport => "MA20支撑",
            Self::DmiGoldenCross => "DMI金叉",
            Self::DmiAdxStrong => "ADX强势",
            Self::CciOversold => "CCI超卖",
            Self::CciZeroCross => "CCI零轴上穿",
            Self::RocZeroCross => "ROC零轴上穿",
            Self::RocDivergence => "ROC底背离",
        }
    }

    pub fn family(self) -> SignalFamily {
        use SignalType::*;
        match self {
            KdjOversold | KdjGoldenCross | KdjDivergence => SignalFamily::Kdj,
            MacdGoldenCross | MacdZeroCross | MacdDivergence => SignalFamily::Macd,
            RsiOversold | RsiGoldenCross => SignalFamily::Rsi,
            BollBottomTouch | BollWidthExpand => SignalFamily::Boll,
            MaGoldenCross | MaSupport => SignalFamily::Ma,
            DmiGoldenCross | DmiAdxStrong => SignalFamily::Dmi,
            CciOversold | CciZeroCross => SignalFamily::Cci,
            RocZeroCross | RocDivergence => SignalFamily::Roc,
        }
    }

    /// Position in `ALL`.
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal type '{0}'")]
pub struct UnknownSignalType(pub String);

impl FromStr for SignalType {
    type Err = UnknownSignalType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id() == s)
            .ok_or_else(|| UnknownSignalType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_catalogue() {
        for (i, t) in SignalType::ALL.iter().enumerate() {
            assert_eq!(t.ordinal(), i);
        }
    }

    #[test]
    fn ids_round_trip_through_from_str() {
        for t in SignalType::ALL {
            assert_eq!(t.id().parse::<SignalType>().unwrap(), t);
        }
        assert!("kdj_death_cross".parse::<SignalType>().is_err());
    }

    #[test]
    fn serde_uses_ids() {
        let json = serde_json::to_string(&SignalType::MaGoldenCross).unwrap();
        assert_eq!(json, "\"ma_golden_cross\"");
    }

    #[test]
    fn id_prefix_matches_family() {
        for t in SignalType::ALL {
            assert!(t.id().starts_with(t.family().as_str()), "{t}");
        }
    }
}
