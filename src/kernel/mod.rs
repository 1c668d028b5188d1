//! Kernel layer — the numerical core.
//!
//! - [`Snapshot`]: one batch × feature observation of a layer's output
//! - [`Covariance`]: representative-row stacking and unbiased covariance
//! - [`EigenSpectrum`]: sorted eigenpairs and the saturation index
//! - [`Estimate`] / [`SkipReason`]: typed scoring outcomes
//!
//! This layer has no dependencies on [`memory`](crate::memory) or
//! [`highlevel`](crate::highlevel).
//!
//! # Example
//!
//! ```rust
//! use delve::kernel::{Covariance, EigenSpectrum, Snapshot};
//!
//! let history: Vec<Snapshot> = (0..8)
//!     .map(|i| {
//!         let t = i as f64;
//!         Snapshot::from_rows(&[vec![t, 2.0 * t + (t * 1.3).sin(), 1.0]]).unwrap()
//!     })
//!     .collect();
//!
//! let cov = Covariance::from_history(&history).unwrap();
//! let spectrum = EigenSpectrum::from_covariance(&cov).unwrap();
//! assert!(spectrum.saturation() > 1.0 / 3.0);
//! ```

pub mod covariance;
pub mod outcome;
pub mod snapshot;
pub mod spectrum;

pub use covariance::{observation_matrix, Covariance, REPRESENTATIVE_ROW};
pub use outcome::{Estimate, SkipReason};
pub use snapshot::Snapshot;
pub use spectrum::EigenSpectrum;
