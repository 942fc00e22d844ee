//! Rate of Change (ROC).
//!
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period. A zero base close leaves the cell unavailable.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        (0..bars.len())
            .map(|i| {
                let Some(base_idx) = i.checked_sub(self.period) else {
                    return f64::NAN;
                };
                let base = bars[base_idx].close;
                if base == 0.0 {
                    f64::NAN
                } else {
                    // NaN on either side propagates through the arithmetic
                    (bars[i].close - base) / base * 100.0
                }
            })
            .collect()
    }
}
