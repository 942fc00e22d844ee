//! Commodity Channel Index (CCI).
//!
//! CCI = (TP - SMA(TP, period)) / (0.015 * mean absolute deviation of TP)
//! where TP = (high + low + close) / 3.
//!
//! A zero mean deviation (flat window) leaves the cell unavailable instead of
//! dividing by zero. Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

const LAMBERT_CONSTANT: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    name: String,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self {
            period,
            name: format!("cci_{period}"),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let tp: Vec<f64> = bars.iter().map(Bar::typical_price).collect();
        for i in (self.period - 1)..n {
            let window = &tp[i + 1 - self.period..=i];
            let mean = window.iter().sum::<f64>() / self.period as f64;
            let mean_dev =
                window.iter().map(|v| (v - mean).abs()).sum::<f64>() / self.period as f64;
            if mean_dev > 0.0 {
                result[i] = (tp[i] - mean) / (LAMBERT_CONSTANT * mean_dev);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn cci_known_value() {
        // typical prices 10, 11, 15 (flat bars): mean 12, MAD (2+1+3)/3 = 2
        let bars = make_ohlc_bars(&[
            (10.0, 10.0, 10.0, 10.0),
            (11.0, 11.0, 11.0, 11.0),
            (15.0, 15.0, 15.0, 15.0),
        ]);
        let result = Cci::new(3).compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 3.0 / (0.015 * 2.0), DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_is_unavailable() {
        let bars = make_ohlc_bars(&[(5.0, 6.0, 4.0, 5.0); 5]);
        let result = Cci::new(3).compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn cci_lookback() {
        assert_eq!(Cci::new(20).lookback(), 19);
    }
}
