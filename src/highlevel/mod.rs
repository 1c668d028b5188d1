//! High-level training-loop integration.
//!
//! This layer provides [`SaturationMonitor`], a callback that owns a
//! [`SampleBuffer`](crate::memory::SampleBuffer) and a
//! [`SaturationEstimator`](crate::estimator::SaturationEstimator) and maps
//! the host's training start / step / epoch end hooks onto them. The host
//! supplies layer outputs through the [`ModelProbe`] trait.
//!
//! For custom loops, drive the [`memory`](crate::memory) and
//! [`estimator`](crate::estimator) layers directly.

pub mod monitor;

pub use monitor::{ModelProbe, Phase, SaturationMonitor};
