//! Saturation estimator.
//!
//! Turns a layer's epoch history into one [`Estimate`]. The estimator holds
//! nothing but its configuration: every call is a pure function of the
//! snapshots it is given, and every layer is scored in isolation.

use super::report::{EpochReport, LayerReport};
use crate::config::SaturationConfig;
use crate::error::Result;
use crate::kernel::{Covariance, EigenSpectrum, Estimate, SkipReason, Snapshot};
use crate::memory::SampleBuffer;
use std::io::{self, Write};

/// Scores layer histories at epoch end.
///
/// # Example
///
/// ```rust
/// use delve::kernel::Snapshot;
/// use delve::{SaturationConfig, SaturationEstimator};
///
/// let estimator = SaturationEstimator::new(SaturationConfig::default()).unwrap();
///
/// // Two features moving together: one active direction.
/// let history: Vec<Snapshot> = (0..6)
///     .map(|i| Snapshot::from_rows(&[vec![i as f64, 2.0 * i as f64]]).unwrap())
///     .collect();
/// let score = estimator.score_layer(&history).score().unwrap();
/// assert!((score - 1.0).abs() < 1e-9);
///
/// // A single snapshot cannot be scored.
/// assert!(!estimator.score_layer(&history[..1]).is_available());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SaturationEstimator {
    config: SaturationConfig,
}

impl SaturationEstimator {
    pub fn new(config: SaturationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SaturationConfig {
        &self.config
    }

    /// Sorted eigenspectrum of the history's covariance.
    pub fn spectrum(&self, history: &[Snapshot]) -> std::result::Result<EigenSpectrum, SkipReason> {
        let cov = Covariance::from_history(history)?;
        EigenSpectrum::from_covariance(&cov)
    }

    /// Saturation score of one layer's history.
    pub fn score_layer(&self, history: &[Snapshot]) -> Estimate {
        self.spectrum(history).map(|s| s.saturation()).into()
    }

    /// Score every layer in the buffer, reporting to stdout on print epochs.
    pub fn score_all(&self, buffer: &SampleBuffer, epoch: usize) -> EpochReport {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.score_all_to(buffer, epoch, &mut out)
    }

    /// Like [`score_all`](Self::score_all), writing the report to `out`.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn score_all_to<W: Write>(&self, buffer: &SampleBuffer, epoch: usize, out: &mut W) -> EpochReport {
        let layers = buffer
            .histories()
            .map(|history| {
                let name = history.layer().name();
                let spectrum = self.spectrum(history.snapshots());
                if let Err(reason) = &spectrum {
                    tracing::debug!(
                        layer = %name,
                        epoch,
                        observations = history.len(),
                        reason = %reason,
                        "layer not scored"
                    );
                }
                LayerReport::new(name, spectrum)
            })
            .collect();
        let report = EpochReport::new(epoch, layers);

        if self.config.is_print_epoch(epoch) {
            for line in report.lines() {
                if let Err(e) = writeln!(out, "{}", line) {
                    tracing::debug!(error = %e, "failed to write saturation report");
                    break;
                }
            }
        }
        report
    }
}
