//! Signal catalogue, detection and events.
//!
//! Signals are pure functions of the indicator frame: they never see future
//! bars or any state outside the frame.

pub mod detector;
pub mod event;
pub mod kind;
pub mod snapshot;

pub use detector::SignalDetector;
pub use event::{ForwardOutcome, SignalEvent};
pub use kind::{SignalFamily, SignalType, UnknownSignalType};
pub use snapshot::IndicatorSnapshot;
