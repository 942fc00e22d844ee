//! Weighted Moving Average (WMA).
//!
//! Linear weights 1..=period, newest bar heaviest:
//! WMA[t] = Σ w_k * close[t-period+k] / Σ w_k
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    name: String,
}

impl Wma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "WMA period must be >= 1");
        Self {
            period,
            name: format!("wma_{period}"),
        }
    }
}

impl Indicator for Wma {
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

        let denom = (self.period * (self.period + 1)) as f64 / 2.0;
        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            let weighted: f64 = window
                .iter()
                .enumerate()
                .map(|(k, b)| (k + 1) as f64 * b.close)
                .sum();
            result[i] = weighted / denom;
        }
        result
    }
}
