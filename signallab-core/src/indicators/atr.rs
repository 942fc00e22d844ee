//! Average True Range (ATR) and the Wilder smoother shared by RSI and DMI.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period).
//! Lookback: period (TR needs a previous close, then `period` values to seed).

use super::ema::seeded_smooth;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// True Range series.
///
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let range = bar.high - bar.low;
        let value = match i.checked_sub(1).map(|p| bars[p].close) {
            None => range,
            Some(pc) => range.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
        };
        // f64::max drops a NaN operand, so re-check the inputs explicitly
        let inputs_valid = !bar.high.is_nan()
            && !bar.low.is_nan()
            && (i == 0 || !bars[i - 1].close.is_nan());
        tr.push(if inputs_valid { value } else { f64::NAN });
    }
    tr
}

/// Wilder smoothing (alpha = 1/period).
///
/// Seeded with the mean of the first run of `period` consecutive valid values.
/// NaN before the seed; after it a NaN input blanks only its own cell.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    seeded_smooth(values, period, 1.0 / period as f64)
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut tr = true_range(bars);
        // TR[0] is only high-low; the seed starts at TR[1]
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }
        wilder_smooth(&tr, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, 6, 2) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, 1, 8) = 9
        ]);
        let tr = true_range(&bars);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bars = make_ohlc_bars(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = |115-100| = 15
        ]);
        assert_approx(true_range(&bars)[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_nan_prev_close() {
        let mut bars = make_ohlc_bars(&[(1.0, 2.0, 0.5, 1.5), (1.5, 2.5, 1.0, 2.0)]);
        bars[0].close = f64::NAN;
        assert!(true_range(&bars)[1].is_nan());
    }

    #[test]
    fn atr_period_3() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        let result = Atr::new(3).compute(&bars);

        assert!(result[..3].iter().all(|v| v.is_nan()));
        // seed = mean(8, 9, 6); then (1/3)*6 + (2/3)*seed
        assert_approx(result[3], 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 64.0 / 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_seeds_after_nan_gap() {
        let values = [1.0, f64::NAN, 2.0, 4.0, 6.0];
        let result = wilder_smooth(&values, 2);
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_resumes_after_nan() {
        let values = [2.0, 4.0, f64::NAN, 6.0];
        let result = wilder_smooth(&values, 2);
        assert_approx(result[1], 3.0, DEFAULT_EPSILON);
        assert!(result[2].is_nan());
        // 0.5 * 6 + 0.5 * 3
        assert_approx(result[3], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_recovers_after_void_bar() {
        let mut bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 108.0, 103.0, 107.0),
            (107.0, 109.0, 104.0, 108.0),
        ]);
        bars[4].high = f64::NAN;
        let result = Atr::new(3).compute(&bars);
        assert!(result[3].is_finite());
        assert!(result[4].is_nan());
        assert!(result[5].is_finite());
        assert!(result[6].is_finite());
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 14);
    }
}
