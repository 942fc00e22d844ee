//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Five lines, each a separate Indicator instance:
//! - Middle: SMA(close, period)
//! - Upper / Lower: middle ± mult * stddev(close, period)
//! - Bandwidth: upper - lower
//! - PercentB: (close - lower) / bandwidth, unavailable when the bands collapse
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

/// Which line of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
    Bandwidth,
    PercentB,
}

impl BollingerBand {
    fn slug(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Middle => "middle",
            Self::Lower => "lower",
            Self::Bandwidth => "bandwidth",
            Self::PercentB => "percent_b",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            band,
            name: format!("boll_{}_{period}_{multiplier}", band.slug()),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            if window.iter().any(|b| b.close.is_nan()) {
                continue;
            }

            let mean = window.iter().map(|b| b.close).sum::<f64>() / self.period as f64;
            let variance = window
                .iter()
                .map(|b| (b.close - mean).powi(2))
                .sum::<f64>()
                / self.period as f64;
            let half_width = self.multiplier * variance.sqrt();
            let (upper, lower) = (mean + half_width, mean - half_width);

            result[i] = match self.band {
                BollingerBand::Middle => mean,
                BollingerBand::Upper => upper,
                BollingerBand::Lower => lower,
                BollingerBand::Bandwidth => upper - lower,
                BollingerBand::PercentB => {
                    let width = upper - lower;
                    if width > 0.0 {
                        (bars[i].close - lower) / width
                    } else {
                        f64::NAN
                    }
                }
            };
        }

        result
    }
}
