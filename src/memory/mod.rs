//! Memory layer: what is held between training steps.
//!
//! - [`MonitoredLayer`] / [`LayerDescriptor`] — which layers are watched and
//!   which output signal each one exposes
//! - [`SampleBuffer`] — per-layer [`EpochHistory`] filled at the sampling
//!   cadence and cleared at every epoch end
//!
//! The buffer is the only stateful piece of the crate; the estimator only
//! ever reads the slices it hands out.

pub mod buffer;
pub mod layer;

pub use buffer::{EpochHistory, SampleBuffer, DEFAULT_SAMPLE_RATE};
pub use layer::{select_monitored, LayerDescriptor, MonitoredLayer, OutputSignal};
