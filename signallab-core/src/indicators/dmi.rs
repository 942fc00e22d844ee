//! DMI: Directional Movement Index (Wilder), with ADX.
//!
//! Steps:
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smooth +DM, -DM and TR over `length`
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX over `signal`
//!
//! Lookback: +DI/-DI = length, ADX = length + signal - 1.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiLine {
    PlusDi,
    MinusDi,
    Adx,
}

#[derive(Debug, Clone)]
pub struct Dmi {
    length: usize,
    signal: usize,
    line: DmiLine,
    name: String,
}

impl Dmi {
    pub fn new(length: usize, signal: usize, line: DmiLine) -> Self {
        assert!(length >= 1 && signal >= 1, "DMI lengths must be >= 1");
        let name = match line {
            DmiLine::PlusDi => format!("dmi_plus_{length}"),
            DmiLine::MinusDi => format!("dmi_minus_{length}"),
            DmiLine::Adx => format!("adx_{length}_{signal}"),
        };
        Self {
            length,
            signal,
            line,
            name,
        }
    }
}

/// +DI, -DI and ADX series.
pub fn directional_lines(bars: &[Bar], length: usize, signal: usize) -> [Vec<f64>; 3] {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let mut tr = true_range(bars);
    // keep TR aligned with the DM series, which start at bar 1
    if let Some(first) = tr.first_mut() {
        *first = f64::NAN;
    }

    let smooth_tr = wilder_smooth(&tr, length);
    let smooth_plus = wilder_smooth(&plus_dm, length);
    let smooth_minus = wilder_smooth(&minus_dm, length);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        let str_ = smooth_tr[i];
        if str_.is_nan() || str_ == 0.0 || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        plus_di[i] = 100.0 * smooth_plus[i] / str_;
        minus_di[i] = 100.0 * smooth_minus[i] / str_;
        let sum = plus_di[i] + minus_di[i];
        dx[i] = if sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di[i] - minus_di[i]).abs() / sum
        };
    }

    let adx = wilder_smooth(&dx, signal);
    [plus_di, minus_di, adx]
}

impl Indicator for Dmi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            DmiLine::PlusDi | DmiLine::MinusDi => self.length,
            DmiLine::Adx => self.length + self.signal - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let [plus, minus, adx] = directional_lines(bars, self.length, self.signal);
        match self.line {
            DmiLine::PlusDi => plus,
            DmiLine::MinusDi => minus,
            DmiLine::Adx => adx,
        }
    }
}
