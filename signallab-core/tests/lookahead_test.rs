//! Look-ahead contamination tests for every indicator and the signal detector.
//!
//! No value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Bars 0..100 must be identical between both runs.

use chrono::NaiveDate;
use signallab_core::domain::{Bar, BarSeries};
use signallab_core::indicators::*;
use signallab_core::{IndicatorEngine, SignalDetector};

/// N bars of synthetic OHLCV data from a deterministic LCG walk.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut price = 100.0;

    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);

            let open = price - 0.5;
            let close = price + 0.3;
            let high = open.max(close) + 2.0;
            let low = open.min(close) - 2.0;
            Bar::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1000.0 + i as f64 * 100.0,
            )
        })
        .collect()
}

fn assert_same(name: &str, truncated: &[f64], full: &[f64]) {
    for (i, (&t, &f)) in truncated.iter().zip(full).enumerate() {
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            !t.is_nan() && !f.is_nan(),
            "{name}: NaN mismatch at bar {i} (truncated={t}, full={f})"
        );
        assert!(
            (t - f).abs() < 1e-10,
            "{name}: look-ahead contamination at bar {i}: truncated={t}, full={f}"
        );
    }
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let full = indicator.compute(full_bars);
    let truncated = indicator.compute(&full_bars[..truncated_len]);

    assert_eq!(truncated.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full.len(), full_bars.len(), "{}", indicator.name());
    assert_same(indicator.name(), &truncated, &full);
}

#[test]
fn lookahead_moving_averages() {
    let bars = make_test_bars(200);
    for period in [5, 10, 20, 30, 60] {
        assert_no_lookahead(&Sma::new(period), &bars, 100);
        assert_no_lookahead(&Ema::new(period), &bars, 100);
        assert_no_lookahead(&Wma::new(period), &bars, 100);
    }
}

#[test]
fn lookahead_kdj() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Stochastic::k(9, 3), &bars, 100);
    assert_no_lookahead(&Stochastic::d(9, 3), &bars, 100);
    assert_no_lookahead(&Stochastic::j(9, 3), &bars, 100);
}

#[test]
fn lookahead_macd() {
    let bars = make_test_bars(200);
    for line in [MacdLine::Macd, MacdLine::Signal, MacdLine::Histogram] {
        assert_no_lookahead(&Macd::new(12, 26, 9, line), &bars, 100);
    }
}

#[test]
fn lookahead_rsi() {
    let bars = make_test_bars(200);
    for period in [6, 12, 24] {
        assert_no_lookahead(&Rsi::new(period), &bars, 100);
    }
}

#[test]
fn lookahead_bollinger() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Bollinger::upper(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::middle(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::lower(20, 2.0), &bars, 100);
    assert_no_lookahead(&Bollinger::new(20, 2.0, BollingerBand::Bandwidth), &bars, 100);
    assert_no_lookahead(&Bollinger::new(20, 2.0, BollingerBand::PercentB), &bars, 100);
}

#[test]
fn lookahead_dmi() {
    let bars = make_test_bars(200);
    for line in [DmiLine::PlusDi, DmiLine::MinusDi, DmiLine::Adx] {
        assert_no_lookahead(&Dmi::new(14, 14, line), &bars, 100);
    }
}

#[test]
fn lookahead_remaining() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Atr::new(14), &bars, 100);
    assert_no_lookahead(&Cci::new(20), &bars, 100);
    assert_no_lookahead(&Roc::new(12), &bars, 100);
    assert_no_lookahead(&Obv::new(), &bars, 100);
    assert_no_lookahead(&Vwap::new(), &bars, 100);
}

#[test]
fn lookahead_frame_columns() {
    let bars = make_test_bars(200);
    let engine = IndicatorEngine::default();
    let full = engine.compute_bars(&bars);
    let truncated = engine.compute_bars(&bars[..100]);

    assert_same("kdj_j", truncated.kdj_j.as_slice(), &full.kdj_j.as_slice()[..100]);
    assert_same("macd", truncated.macd.as_slice(), &full.macd.as_slice()[..100]);
    assert_same("adx", truncated.adx.as_slice(), &full.adx.as_slice()[..100]);
    for (period, column) in truncated.sma.iter() {
        let full_column = full.sma.get(period).unwrap();
        assert_same("sma", column.as_slice(), &full_column.as_slice()[..100]);
    }
}

#[test]
fn lookahead_detection() {
    let bars = make_test_bars(200);
    let full = BarSeries::new("LCG", bars.clone()).unwrap();
    let truncated = BarSeries::new("LCG", bars[..100].to_vec()).unwrap();

    let engine = IndicatorEngine::default();
    let full_frame = engine.compute(&full);
    let truncated_frame = engine.compute(&truncated);
    let detector = SignalDetector::default();

    for i in 1..100 {
        assert_eq!(
            detector.evaluate(&truncated_frame, i, Some(i - 1)),
            detector.evaluate(&full_frame, i, Some(i - 1)),
            "signals at bar {i} changed when future bars were appended"
        );
    }
}
