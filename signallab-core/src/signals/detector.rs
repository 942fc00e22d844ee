//! SignalDetector: evaluates the 18-predicate catalogue on one bar.
//!
//! Each predicate reads the current bar, a prior bar (for crosses) or the
//! `divergence_lookback` bars preceding the current one. A predicate whose
//! inputs are not all available is skipped: it neither fires nor fails.

use super::event::SignalEvent;
use super::kind::SignalType;
use crate::config::SignalConfig;
use crate::domain::BarSeries;
use crate::frame::{Column, IndicatorFrame};

const KDJ_OVERSOLD: f64 = 20.0;
const RSI_OVERSOLD: f64 = 20.0;
const BOLL_TOUCH_FACTOR: f64 = 1.01;
const BOLL_EXPAND_FACTOR: f64 = 1.1;
const MA_SUPPORT_BAND: f64 = 0.01;
const DMI_CROSS_MIN_ADX: f64 = 20.0;
const ADX_STRONG: f64 = 30.0;
const CCI_OVERSOLD: f64 = -100.0;

/// `a` strictly below `b` on the prior bar and strictly above it now.
fn crossed_above(a: &Column, b: &Column, index: usize, prior: usize) -> Option<bool> {
    let (a_prev, b_prev) = (a.get(prior)?, b.get(prior)?);
    let (a_now, b_now) = (a.get(index)?, b.get(index)?);
    Some(a_prev < b_prev && a_now > b_now)
}

/// Strictly negative on the prior bar and strictly positive now.
fn crossed_zero(col: &Column, index: usize, prior: usize) -> Option<bool> {
    Some(col.get(prior)? < 0.0 && col.get(index)? > 0.0)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

#[derive(Debug, Clone, Default)]
pub struct SignalDetector {
    config: SignalConfig,
}

impl SignalDetector {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Signal types firing at `index`, in catalogue order.
    ///
    /// `prior` is the bar used for cross detection; `None` skips every
    /// cross predicate.
    pub fn evaluate(
        &self,
        frame: &IndicatorFrame,
        index: usize,
        prior: Option<usize>,
    ) -> Vec<SignalType> {
        SignalType::ALL
            .into_iter()
            .filter(|&t| self.check(t, frame, index, prior) == Some(true))
            .collect()
    }

    /// Fired events at `index`, with family snapshots.
    pub fn detect(
        &self,
        series: &BarSeries,
        frame: &IndicatorFrame,
        index: usize,
        prior: Option<usize>,
    ) -> Vec<SignalEvent> {
        let Some(bar) = series.get(index) else {
            return Vec::new();
        };
        self.evaluate(frame, index, prior)
            .into_iter()
            .map(|t| {
                let snapshot = t.family().snapshot(frame, index, &self.config);
                SignalEvent::new(bar.date, index, t, bar.close, snapshot)
            })
            .collect()
    }

    /// Evaluate one predicate. `None` means it was skipped for missing data.
    pub fn check(
        &self,
        signal: SignalType,
        frame: &IndicatorFrame,
        index: usize,
        prior: Option<usize>,
    ) -> Option<bool> {
        let f = frame;
        let i = index;
        let close = || f.close.get(i);

        match signal {
            SignalType::KdjOversold => {
                Some(f.kdj_k.get(i)? < KDJ_OVERSOLD && f.kdj_d.get(i)? < KDJ_OVERSOLD)
            }
            SignalType::KdjGoldenCross => crossed_above(&f.kdj_k, &f.kdj_d, i, prior?),
            SignalType::KdjDivergence => self.divergence(f, &f.kdj_k, i),

            SignalType::MacdGoldenCross => crossed_above(&f.macd, &f.macd_signal, i, prior?),
            SignalType::MacdZeroCross => crossed_zero(&f.macd, i, prior?),
            SignalType::MacdDivergence => self.divergence(f, &f.macd, i),

            SignalType::RsiOversold => Some(self.rsi_fast(f)?.get(i)? < RSI_OVERSOLD),
            SignalType::RsiGoldenCross => {
                crossed_above(self.rsi_fast(f)?, self.rsi_slow(f)?, i, prior?)
            }

            SignalType::BollBottomTouch => Some(close()? <= f.boll_lower.get(i)? * BOLL_TOUCH_FACTOR),
            SignalType::BollWidthExpand => {
                let prev = f.boll_bandwidth.get(prior?)?;
                Some(f.boll_bandwidth.get(i)? > prev * BOLL_EXPAND_FACTOR)
            }

            SignalType::MaGoldenCross => {
                crossed_above(self.ma_fast(f)?, self.ma_slow(f)?, i, prior?)
            }
            SignalType::MaSupport => {
                let ma = self.ma_slow(f)?.get(i)?;
                let c = close()?;
                Some(c > ma * (1.0 - MA_SUPPORT_BAND) && c < ma * (1.0 + MA_SUPPORT_BAND))
            }

            SignalType::DmiGoldenCross => {
                let crossed = crossed_above(&f.dmi_plus, &f.dmi_minus, i, prior?)?;
                Some(crossed && f.adx.get(i)? > DMI_CROSS_MIN_ADX)
            }
            SignalType::DmiAdxStrong => Some(f.adx.get(i)? > ADX_STRONG),

            SignalType::CciOversold => Some(f.cci.get(i)? < CCI_OVERSOLD),
            SignalType::CciZeroCross => crossed_zero(&f.cci, i, prior?),

            SignalType::RocZeroCross => crossed_zero(&f.roc, i, prior?),
            SignalType::RocDivergence => self.divergence(f, &f.roc, i),
        }
    }

    /// Bullish divergence: close below the minimum close of the preceding
    /// window while the indicator stays above its own window minimum.
    fn divergence(&self, frame: &IndicatorFrame, indicator: &Column, index: usize) -> Option<bool> {
        let start = index.checked_sub(self.config.divergence_lookback)?;
        let closes = frame.close.window(start, index)?;
        let values = indicator.window(start, index)?;
        let close = frame.close.get(index)?;
        let value = indicator.get(index)?;
        Some(close < min_of(closes) && value > min_of(values))
    }

    fn rsi_fast<'f>(&self, frame: &'f IndicatorFrame) -> Option<&'f Column> {
        frame.rsi.get(self.config.rsi_fast)
    }

    fn rsi_slow<'f>(&self, frame: &'f IndicatorFrame) -> Option<&'f Column> {
        frame.rsi.get(self.config.rsi_slow)
    }

    fn ma_fast<'f>(&self, frame: &'f IndicatorFrame) -> Option<&'f Column> {
        frame.sma.get(self.config.ma_fast)
    }

    fn ma_slow<'f>(&self, frame: &'f IndicatorFrame) -> Option<&'f Column> {
        frame.sma.get(self.config.ma_slow)
    }
}
