//! Domain types for SignalLab

pub mod bar;
pub mod series;

pub use bar::Bar;
pub use series::{BarSeries, SeriesError};
