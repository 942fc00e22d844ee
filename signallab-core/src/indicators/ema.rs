//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//!
//! Two seedings are provided:
//! - `ema_of_series`: seeded with the SMA of the first `period` values, lookback
//!   period - 1. Used for the EMA columns.
//! - `ewm_of_series`: seeded with the first value itself, available from bar 0.
//!   Used for MACD, whose lines are conventionally defined over the whole history.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.period)
    }
}

fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// SMA-seeded EMA of an arbitrary series.
///
/// Seeded with the mean of the first run of `period` consecutive valid values.
/// A NaN after the seed leaves that cell NaN; the recursion carries on from
/// the last valid value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    seeded_smooth(values, period, alpha(period))
}

/// Mean-seeded recursive smoothing shared by the EMA and Wilder smoothers.
pub(crate) fn seeded_smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let mut run = 0usize;
    let mut seed_end = None;
    for (i, v) in values.iter().enumerate() {
        run = if v.is_nan() { 0 } else { run + 1 };
        if run == period {
            seed_end = Some(i + 1);
            break;
        }
    }
    let Some(seed_end) = seed_end else {
        return result;
    };

    let seed = values[seed_end - period..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    smooth_from(values, &mut result, seed_end, seed, alpha);
    result
}

/// First-value-seeded EMA (recursive form, no bias adjustment).
///
/// Leading NaNs are skipped; the recursion starts at the first valid value.
pub fn ewm_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    result[start] = values[start];

    smooth_from(values, &mut result, start + 1, values[start], alpha(period));
    result
}

fn smooth_from(values: &[f64], result: &mut [f64], from: usize, seed: f64, alpha: f64) {
    let mut prev = seed;
    for i in from..values.len() {
        // a void input only blanks its own cell
        if values[i].is_nan() {
            continue;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed at index 2 = SMA(10,11,12) = 11
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seeds_after_nan_in_first_window() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[1].close = f64::NAN;
        let result = Ema::new(3).compute(&bars);
        // first clean run is 12, 13, 14
        assert!(result[..4].iter().all(|v| v.is_nan()));
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_resumes_after_void_bar() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        bars[3].close = f64::NAN;
        let result = Ema::new(3).compute(&bars);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        // carries on from EMA[2] = 11: 0.5 * 14 + 0.5 * 11
        assert_approx(result[4], 12.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_resumes_after_void_value() {
        let result = ewm_of_series(&[10.0, f64::NAN, 14.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert!(result[1].is_nan());
        assert_approx(result[2], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_is_available_from_first_bar() {
        // alpha = 0.5: 10, 0.5*12+0.5*10 = 11, 0.5*15+0.5*11 = 13
        let result = ewm_of_series(&[10.0, 12.0, 15.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 11.0, DEFAULT_EPSILON);
        assert_approx(result[2], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ewm_skips_leading_nan() {
        let result = ewm_of_series(&[f64::NAN, 4.0, 8.0], 3);
        assert!(result[0].is_nan());
        assert_approx(result[1], 4.0, DEFAULT_EPSILON);
        assert_approx(result[2], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
    }
}
