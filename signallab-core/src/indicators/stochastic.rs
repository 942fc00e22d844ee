//! Stochastic oscillator in its KDJ form.
//!
//! - K: 100 * (close - lowest low) / (highest high - lowest low) over `period`
//! - D: SMA(K, signal)
//! - J: 3K - 2D
//!
//! A flat window (highest high == lowest low) leaves K unavailable for that
//! bar, and D/J for every bar whose smoothing window touches it.
//! Lookback: K = period - 1, D and J = period + signal - 2.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
    J,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    signal: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(period: usize, signal: usize, line: StochasticLine) -> Self {
        assert!(period >= 1, "stochastic period must be >= 1");
        assert!(signal >= 1, "stochastic signal must be >= 1");
        let tag = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
            StochasticLine::J => "j",
        };
        Self {
            period,
            signal,
            line,
            name: format!("kdj_{tag}_{period}_{signal}"),
        }
    }

    pub fn k(period: usize, signal: usize) -> Self {
        Self::new(period, signal, StochasticLine::K)
    }

    pub fn d(period: usize, signal: usize) -> Self {
        Self::new(period, signal, StochasticLine::D)
    }

    pub fn j(period: usize, signal: usize) -> Self {
        Self::new(period, signal, StochasticLine::J)
    }
}

/// Raw %K series.
pub fn percent_k(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut k = vec![f64::NAN; n];
    if period == 0 || n < period {
        return k;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        if window.iter().any(|b| b.high.is_nan() || b.low.is_nan()) {
            continue;
        }
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let range = highest - lowest;
        if range > 0.0 {
            k[i] = 100.0 * (bars[i].close - lowest) / range;
        }
    }
    k
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            StochasticLine::K => self.period - 1,
            StochasticLine::D | StochasticLine::J => self.period + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let k = percent_k(bars, self.period);
        if self.line == StochasticLine::K {
            return k;
        }

        let d = sma_of_series(&k, self.signal);
        match self.line {
            StochasticLine::J => k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect(),
            _ => d,
        }
    }
}
