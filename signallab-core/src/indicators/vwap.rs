//! Volume-Weighted Average Price (VWAP), cumulative over the whole series.
//!
//! VWAP[t] = Σ(typical_price * volume) / Σ volume over bars 0..=t,
//! typical price = (high + low + close) / 3.
//! Unavailable while cumulative volume is zero. Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut cum_tp_vol = 0.0;
        let mut cum_vol = 0.0;

        bars.iter()
            .map(|bar| {
                let tp_vol = bar.typical_price() * bar.volume;
                // a void bar is skipped, not folded into the running sums
                if tp_vol.is_nan() {
                    return f64::NAN;
                }
                cum_tp_vol += tp_vol;
                cum_vol += bar.volume;
                if cum_vol > 0.0 {
                    cum_tp_vol / cum_vol
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}
