//! MACD: Moving Average Convergence/Divergence.
//!
//! - MACD line: EMA(close, fast) - EMA(close, slow)
//! - Signal line: EMA(MACD, signal)
//! - Histogram: MACD - signal
//!
//! All three EMAs are first-value seeded (`ewm_of_series`), so the lines are
//! defined from the first bar. Lookback: 0.

use super::ema::ewm_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        let tag = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{tag}_{fast}_{slow}_{signal}"),
        }
    }
}

/// MACD line and signal line as a pair of series.
pub fn macd_lines(bars: &[Bar], fast: usize, slow: usize, signal: usize) -> (Vec<f64>, Vec<f64>) {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast_ema = ewm_of_series(&closes, fast);
    let slow_ema = ewm_of_series(&closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ewm_of_series(&line, signal);
    (line, signal_line)
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let (line, signal_line) = macd_lines(bars, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => line,
            MacdLine::Signal => signal_line,
            MacdLine::Histogram => line.iter().zip(&signal_line).map(|(m, s)| m - s).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn first_bar_is_zero() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let line = Macd::new(2, 3, 2, MacdLine::Macd).compute(&bars);
        assert_approx(line[0], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn known_values() {
        // fast alpha 2/3, slow alpha 1/2, signal alpha 2/3
        let bars = make_bars(&[10.0, 13.0]);
        let fast = 10.0 + (2.0 / 3.0) * 3.0; // 12
        let slow = 10.0 + 0.5 * 3.0; // 11.5
        let line = Macd::new(2, 3, 2, MacdLine::Macd).compute(&bars);
        let signal = Macd::new(2, 3, 2, MacdLine::Signal).compute(&bars);
        let hist = Macd::new(2, 3, 2, MacdLine::Histogram).compute(&bars);

        assert_approx(line[1], fast - slow, DEFAULT_EPSILON);
        assert_approx(signal[1], (2.0 / 3.0) * 0.5, DEFAULT_EPSILON);
        assert_approx(hist[1], line[1] - signal[1], DEFAULT_EPSILON);
    }

    #[test]
    fn rising_prices_give_positive_macd() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let line = Macd::new(12, 26, 9, MacdLine::Macd).compute(&make_bars(&closes));
        assert!(line[1..].iter().all(|&v| v > 0.0));
    }

    #[test]
    fn lookback_is_zero() {
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Signal).lookback(), 0);
    }
}
