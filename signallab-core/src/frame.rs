//! IndicatorFrame: fixed-schema structure of arrays over one bar series.
//!
//! Every indicator the signal catalogue can read has its own named field, so
//! a missing column is a compile error rather than a failed string lookup.
//! Cells without a value hold NaN internally and surface as `None`.

use crate::config::IndicatorConfig;
use crate::domain::{Bar, BarSeries};
use crate::indicators::{
    Atr, Bollinger, BollingerBand, Cci, Dmi, DmiLine, Ema, Indicator, Macd, MacdLine, Obv, Roc,
    Rsi, Sma, Stochastic, StochasticLine, Vwap, Wma,
};

/// One indicator's values, aligned with the bars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    values: Vec<f64>,
}

impl Column {
    /// Non-finite inputs (NaN, ±inf) are stored as unavailable.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_finite() { v } else { f64::NAN })
            .collect();
        Self { values }
    }

    pub fn from_indicator(indicator: &dyn Indicator, bars: &[Bar]) -> Self {
        let values = indicator.compute(bars);
        debug_assert_eq!(values.len(), bars.len(), "{} length mismatch", indicator.name());
        Self::new(values)
    }

    /// Value at `index`, or `None` if out of range or unavailable.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    /// All values over `range`, or `None` if any is unavailable.
    pub fn window(&self, start: usize, end: usize) -> Option<&[f64]> {
        let slice = self.values.get(start..end)?;
        slice.iter().all(|v| !v.is_nan()).then_some(slice)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw storage, NaN marking unavailable cells.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// One column per configured period of a moving-average style family.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodColumns {
    columns: Vec<(usize, Column)>,
}

impl PeriodColumns {
    pub fn new(columns: Vec<(usize, Column)>) -> Self {
        Self { columns }
    }

    fn build<I: Indicator>(periods: &[usize], bars: &[Bar], make: impl Fn(usize) -> I) -> Self {
        let columns = periods
            .iter()
            .map(|&p| (p, Column::from_indicator(&make(p), bars)))
            .collect();
        Self { columns }
    }

    pub fn get(&self, period: usize) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, c)| c)
    }

    /// Replace (or add) the column for `period`.
    pub fn set(&mut self, period: usize, column: Column) {
        match self.columns.iter_mut().find(|(p, _)| *p == period) {
            Some((_, c)) => *c = column,
            None => self.columns.push((period, column)),
        }
    }

    pub fn periods(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().map(|(p, _)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns.iter().map(|(p, c)| (*p, c))
    }
}

/// All indicator columns for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub close: Column,

    pub kdj_k: Column,
    pub kdj_d: Column,
    pub kdj_j: Column,

    pub macd: Column,
    pub macd_signal: Column,
    pub macd_hist: Column,

    pub rsi: PeriodColumns,

    pub boll_lower: Column,
    pub boll_middle: Column,
    pub boll_upper: Column,
    pub boll_bandwidth: Column,
    pub boll_percent_b: Column,

    pub sma: PeriodColumns,
    pub ema: PeriodColumns,
    pub wma: PeriodColumns,

    pub vwap: Column,
    pub atr: Column,

    pub dmi_plus: Column,
    pub dmi_minus: Column,
    pub adx: Column,

    pub cci: Column,
    pub obv: Column,
    pub roc: Column,
}

impl IndicatorFrame {
    /// Frame of `len` rows with every cell unavailable and one empty column
    /// per given RSI / SMA period. Callers fill in the columns they need.
    pub fn unavailable(len: usize, rsi_periods: &[usize], sma_periods: &[usize]) -> Self {
        let blank = || Column::new(vec![f64::NAN; len]);
        let periods = |ps: &[usize]| PeriodColumns::new(ps.iter().map(|&p| (p, blank())).collect());
        Self {
            close: blank(),
            kdj_k: blank(),
            kdj_d: blank(),
            kdj_j: blank(),
            macd: blank(),
            macd_signal: blank(),
            macd_hist: blank(),
            rsi: periods(rsi_periods),
            boll_lower: blank(),
            boll_middle: blank(),
            boll_upper: blank(),
            boll_bandwidth: blank(),
            boll_percent_b: blank(),
            sma: periods(sma_periods),
            ema: PeriodColumns::default(),
            wma: PeriodColumns::default(),
            vwap: blank(),
            atr: blank(),
            dmi_plus: blank(),
            dmi_minus: blank(),
            adx: blank(),
            cci: blank(),
            obv: blank(),
            roc: blank(),
        }
    }

    /// Number of bars (rows).
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Computes an `IndicatorFrame` for a fixed parameter set.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn compute(&self, series: &BarSeries) -> IndicatorFrame {
        self.compute_bars(series.bars())
    }

    /// Every column only reads bars at or before its own index.
    pub fn compute_bars(&self, bars: &[Bar]) -> IndicatorFrame {
        let c = &self.config;

        let kdj = |line| Stochastic::new(c.kdj.period, c.kdj.signal, line);
        let macd = |line| Macd::new(c.macd.fast, c.macd.slow, c.macd.signal, line);
        let boll = |band| Bollinger::new(c.boll.period, c.boll.std_dev, band);
        let dmi = |line| Dmi::new(c.dmi.length, c.dmi.signal, line);

        IndicatorFrame {
            close: Column::new(bars.iter().map(|b| b.close).collect()),

            kdj_k: Column::from_indicator(&kdj(StochasticLine::K), bars),
            kdj_d: Column::from_indicator(&kdj(StochasticLine::D), bars),
            kdj_j: Column::from_indicator(&kdj(StochasticLine::J), bars),

            macd: Column::from_indicator(&macd(MacdLine::Macd), bars),
            macd_signal: Column::from_indicator(&macd(MacdLine::Signal), bars),
            macd_hist: Column::from_indicator(&macd(MacdLine::Histogram), bars),

            rsi: PeriodColumns::build(&c.rsi.periods, bars, Rsi::new),

            boll_lower: Column::from_indicator(&boll(BollingerBand::Lower), bars),
            boll_middle: Column::from_indicator(&boll(BollingerBand::Middle), bars),
            boll_upper: Column::from_indicator(&boll(BollingerBand::Upper), bars),
            boll_bandwidth: Column::from_indicator(&boll(BollingerBand::Bandwidth), bars),
            boll_percent_b: Column::from_indicator(&boll(BollingerBand::PercentB), bars),

            sma: PeriodColumns::build(&c.ma.periods, bars, Sma::new),
            ema: PeriodColumns::build(&c.ema.periods, bars, Ema::new),
            wma: PeriodColumns::build(&c.wma.periods, bars, Wma::new),

            vwap: Column::from_indicator(&Vwap::new(), bars),
            atr: Column::from_indicator(&Atr::new(c.atr.length), bars),

            dmi_plus: Column::from_indicator(&dmi(DmiLine::PlusDi), bars),
            dmi_minus: Column::from_indicator(&dmi(DmiLine::MinusDi), bars),
            adx: Column::from_indicator(&dmi(DmiLine::Adx), bars),

            cci: Column::from_indicator(&Cci::new(c.cci.length), bars),
            obv: Column::from_indicator(&Obv::new(), bars),
            roc: Column::from_indicator(&Roc::new(c.roc.length), bars),
        }
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(IndicatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn column_hides_non_finite_values() {
        let col = Column::new(vec![1.0, f64::NAN, f64::INFINITY, 4.0]);
        assert_eq!(col.get(0), Some(1.0));
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(2), None);
        assert_eq!(col.get(3), Some(4.0));
        assert_eq!(col.get(4), None);
    }

    #[test]
    fn column_window_requires_every_value() {
        let col = Column::new(vec![f64::NAN, 2.0, 3.0, 4.0]);
        assert_eq!(col.window(1, 4), Some(&[2.0, 3.0, 4.0][..]));
        assert!(col.window(0, 2).is_none());
        assert!(col.window(2, 9).is_none());
    }

    #[test]
    fn frame_has_every_configured_period() {
        let closes: Vec<f64> = (0..70).map(|i| 50.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let frame = IndicatorEngine::default().compute_bars(&make_bars(&closes));

        assert_eq!(frame.len(), 70);
        assert_eq!(frame.rsi.periods().collect::<Vec<_>>(), vec![6, 12, 24]);
        assert_eq!(frame.sma.periods().count(), 5);
        assert!(frame.sma.get(60).is_some());
        assert!(frame.ema.get(7).is_none());

        // SMA(60) first value at index 59
        let sma60 = frame.sma.get(60).unwrap();
        assert!(sma60.get(58).is_none());
        assert!(sma60.get(59).is_some());
    }

    #[test]
    fn all_columns_match_bar_count() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let f = IndicatorEngine::default().compute_bars(&make_bars(&closes));
        for col in [
            &f.kdj_k, &f.kdj_d, &f.kdj_j, &f.macd, &f.macd_signal, &f.macd_hist, &f.boll_lower,
            &f.boll_middle, &f.boll_upper, &f.boll_bandwidth, &f.boll_percent_b, &f.vwap, &f.atr,
            &f.dmi_plus, &f.dmi_minus, &f.adx, &f.cci, &f.obv, &f.roc,
        ] {
            assert_eq!(col.len(), 30);
        }
    }

    #[test]
    fn void_bar_only_blanks_its_own_day() {
        let closes: Vec<f64> = (0..100).map(|i| 50.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let mut bars = make_bars(&closes);
        bars[20].close = f64::NAN;
        let f = IndicatorEngine::default().compute_bars(&bars);

        assert!(f.macd.get(20).is_none());
        assert!(f.ema.get(5).unwrap().get(20).is_none());

        let last = 99;
        for col in [
            &f.macd, &f.macd_signal, &f.macd_hist, &f.atr, &f.dmi_plus, &f.dmi_minus, &f.adx,
            &f.vwap, &f.obv,
        ] {
            assert!(col.get(last).is_some());
        }
        for period in [6, 12, 24] {
            assert!(f.rsi.get(period).unwrap().get(last).is_some());
        }
        for period in [5, 10, 20, 30, 60] {
            assert!(f.ema.get(period).unwrap().get(last).is_some());
        }
    }
}
