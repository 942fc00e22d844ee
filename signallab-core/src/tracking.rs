//! Follow-up tracking of a published signal.
//!
//! After a signal is published at `entry_price`, the bars from the signal day
//! onward show how far the price went in either direction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtest::round2;
use crate::domain::{Bar, BarSeries};

/// Default tracking horizon in bars after the signal day.
pub const DEFAULT_HORIZON: usize = 30;

/// Highest or lowest close reached during the follow-up window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceExtreme {
    pub close: f64,
    pub date: NaiveDate,
    /// Percent change versus the entry price, two decimals.
    pub change_pct: f64,
    /// Calendar days from the signal date.
    pub days_from_signal: i64,
}

/// One bar of the follow-up path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDay {
    /// 0 is the signal day itself.
    pub days_from_signal: usize,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub signal_date: NaiveDate,
    pub entry_price: f64,
    pub highest: PriceExtreme,
    pub lowest: PriceExtreme,
    pub buy_day_change_rate: Option<f64>,
    pub next_day_change_rate: Option<f64>,
    pub path: Vec<TrackedDay>,
}

/// Track `series` from the first bar on or after `signal_date` over
/// `horizon + 1` bars. Bars without a finite close are left out.
///
/// Returns `None` when no usable bar exists or `entry_price` is not positive.
pub fn follow_up(
    series: &BarSeries,
    signal_date: NaiveDate,
    entry_price: f64,
    horizon: usize,
) -> Option<FollowUp> {
    if !(entry_price.is_finite() && entry_price > 0.0) {
        return None;
    }

    let start = series.position_on_or_after(signal_date)?;
    let end = (start + horizon + 1).min(series.len());
    let window: Vec<_> = series.bars()[start..end]
        .iter()
        .filter(|b| b.close.is_finite())
        .collect();

    let first = window.first()?;
    let (mut high, mut low) = (*first, *first);
    for &bar in &window[1..] {
        // first occurrence wins ties
        if bar.close > high.close {
            high = bar;
        }
        if bar.close < low.close {
            low = bar;
        }
    }

    let extreme = |bar: &Bar| PriceExtreme {
        close: round2(bar.close),
        date: bar.date,
        change_pct: round2((round2(bar.close) - entry_price) / entry_price * 100.0),
        days_from_signal: (bar.date - signal_date).num_days(),
    };

    Some(FollowUp {
        signal_date,
        entry_price,
        highest: extreme(high),
        lowest: extreme(low),
        buy_day_change_rate: window[0].change_rate.filter(|v| v.is_finite()).map(round2),
        next_day_change_rate: window
            .get(1)
            .and_then(|b| b.change_rate)
            .filter(|v| v.is_finite())
            .map(round2),
        path: window
            .iter()
            .enumerate()
            .map(|(i, b)| TrackedDay {
                days_from_signal: i,
                date: b.date,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn series(closes: &[(u32, f64)]) -> BarSeries {
        let bars = closes
            .iter()
            .map(|&(d, c)| {
                let mut bar = Bar::new(day(d), c, c, c, c, 100.0);
                bar.change_rate = Some(d as f64 / 10.0);
                bar
            })
            .collect();
        BarSeries::new("sz000001", bars).unwrap()
    }

    #[test]
    fn finds_extremes_from_signal_day() {
        let s = series(&[(6, 9.0), (7, 10.0), (8, 11.0), (9, 12.5), (10, 9.5), (13, 10.0)]);
        let f = follow_up(&s, day(7), 10.0, 30).unwrap();

        assert_eq!(f.path.len(), 5);
        assert_eq!(f.path[0].date, day(7));
        assert_eq!(f.highest.date, day(9));
        assert_eq!(f.highest.change_pct, 25.0);
        assert_eq!(f.highest.days_from_signal, 2);
        assert_eq!(f.lowest.close, 9.5);
        assert_eq!(f.lowest.change_pct, -5.0);
        assert_eq!(f.buy_day_change_rate, Some(0.7));
        assert_eq!(f.next_day_change_rate, Some(0.8));
    }

    #[test]
    fn signal_on_non_trading_day_starts_next_bar() {
        let s = series(&[(10, 10.0), (13, 10.5)]);
        let f = follow_up(&s, day(11), 10.0, 30).unwrap();
        assert_eq!(f.path[0].date, day(13));
        assert_eq!(f.path[0].days_from_signal, 0);
        assert_eq!(f.highest.days_from_signal, 2);
        assert_eq!(f.next_day_change_rate, None);
    }

    #[test]
    fn horizon_limits_window() {
        let s = series(&[(6, 10.0), (7, 11.0), (8, 30.0)]);
        let f = follow_up(&s, day(6), 10.0, 1).unwrap();
        assert_eq!(f.path.len(), 2);
        assert_eq!(f.highest.close, 11.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        let s = series(&[(6, 10.0)]);
        assert!(follow_up(&s, day(7), 10.0, 30).is_none());
        assert!(follow_up(&s, day(6), 0.0, 30).is_none());
    }
}
