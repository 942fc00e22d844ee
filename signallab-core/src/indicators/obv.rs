//! On-Balance Volume (OBV).
//!
//! Starts at 0 on the first bar; each later bar adds its volume when the close
//! rises, subtracts it when the close falls, and carries the total on a flat
//! close. Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut obv = 0.0;

        for (i, bar) in bars.iter().enumerate() {
            if bar.close.is_nan() || bar.volume.is_nan() {
                result.push(f64::NAN);
                continue;
            }
            if i > 0 {
                let prev = bars[i - 1].close;
                if bar.close > prev {
                    obv += bar.volume;
                } else if bar.close < prev {
                    obv -= bar.volume;
                }
            }
            result.push(obv);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn obv_accumulates_signed_volume() {
        let mut bars = make_bars(&[10.0, 11.0, 11.0, 9.0]);
        for (bar, vol) in bars.iter_mut().zip([500.0, 100.0, 200.0, 50.0]) {
            bar.volume = vol;
        }
        let result = Obv::new().compute(&bars);
        assert_approx(result[0], 0.0, DEFAULT_EPSILON);
        assert_approx(result[1], 100.0, DEFAULT_EPSILON);
        assert_approx(result[2], 100.0, DEFAULT_EPSILON);
        assert_approx(result[3], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn obv_skips_void_volume() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        for (bar, vol) in bars.iter_mut().zip([500.0, 100.0, f64::NAN, 50.0]) {
            bar.volume = vol;
        }
        let result = Obv::new().compute(&bars);
        assert_approx(result[1], 100.0, DEFAULT_EPSILON);
        assert!(result[2].is_nan());
        assert_approx(result[3], 150.0, DEFAULT_EPSILON);
    }
}
