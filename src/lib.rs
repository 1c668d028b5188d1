//! # Delve: layer saturation for feed-forward networks
//!
//! Delve measures how much of a hidden layer's representational capacity is
//! in use during training. It samples the layer's pre-activation outputs
//! every few steps, and at each epoch end eigendecomposes their covariance
//! and reduces the spectrum to one number, the **saturation**:
//!
//! ```text
//! p_i = |λ_i| / Σ|λ_j|          saturation = Σ p_i²   ∈ [1/F, 1]
//! ```
//!
//! Close to `1/F`: variance is spread over all F features. Close to `1`: a
//! single direction carries it all.
//!
//! ## Quick Start
//!
//! ```rust
//! use delve::kernel::Snapshot;
//! use delve::memory::{MonitoredLayer, OutputSignal, SampleBuffer};
//! use delve::{SaturationConfig, SaturationEstimator};
//!
//! let mut buffer = SampleBuffer::new(1).unwrap();
//! buffer.initialize([MonitoredLayer::new("dense_1", OutputSignal::PreActivation)]);
//!
//! for step in 0..8 {
//!     let t = step as f64;
//!     let snap = Snapshot::from_rows(&[vec![t, t.sin(), 0.0]]).unwrap();
//!     buffer.record_step(step, [("dense_1", snap)]);
//! }
//!
//! let estimator = SaturationEstimator::new(SaturationConfig::default()).unwrap();
//! let report = estimator.score_all_to(&buffer, 0, &mut std::io::sink());
//! let score = report.scores()["dense_1"];
//! assert!(score > 1.0 / 3.0 && score < 1.0);
//! buffer.reset();
//! ```
//!
//! ## Layers
//!
//! - [`kernel`]: snapshots, covariance, eigenspectrum, scoring outcomes
//! - [`memory`]: monitored layers and the per-epoch [`SampleBuffer`](memory::SampleBuffer)
//! - [`estimator`]: epoch-end scoring and reports
//! - [`highlevel`]: [`SaturationMonitor`](highlevel::SaturationMonitor) training-loop callback

pub mod config;
pub mod error;
pub mod estimator;
pub mod highlevel;
pub mod kernel;
pub mod memory;

// Re-exports for convenience
pub use config::{SaturationConfig, Statistic};
pub use error::{DelveError, Result};
pub use estimator::{EpochRecord, EpochReport, SaturationEstimator};
pub use highlevel::{ModelProbe, Phase, SaturationMonitor};
pub use kernel::{EigenSpectrum, Estimate, SkipReason, Snapshot};
pub use memory::{LayerDescriptor, MonitoredLayer, OutputSignal, SampleBuffer};
