//! Estimator layer: epoch-end scoring.
//!
//! [`SaturationEstimator`] drains each layer of a
//! [`SampleBuffer`](crate::memory::SampleBuffer) and produces an
//! [`EpochReport`]; the report formats the textual lines and merges the
//! configured statistics into the host's [`EpochRecord`].

pub mod report;
pub mod saturation;

pub use report::{EpochRecord, EpochReport, LayerReport};
pub use saturation::SaturationEstimator;
