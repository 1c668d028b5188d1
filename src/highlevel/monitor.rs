//! Training-loop callback that owns a [`SampleBuffer`] and a
//! [`SaturationEstimator`] and wires them to the host's lifecycle hooks.
//!
//! The host implements [`ModelProbe`] to evaluate one layer on the fixed
//! probe batch. Nothing here ever returns an error to the training loop: a
//! failing probe skips that layer for that step, and an unscorable layer is
//! left out of that epoch's record.

use crate::config::SaturationConfig;
use crate::error::Result;
use crate::estimator::{EpochRecord, SaturationEstimator};
use crate::kernel::Snapshot;
use crate::memory::{select_monitored, LayerDescriptor, MonitoredLayer, SampleBuffer};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Evaluation mode the host must run the model in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Deterministic evaluation: no dropout, frozen normalization statistics.
    Inference,
    Training,
}

/// Host-side access to the model's layer outputs.
pub trait ModelProbe {
    /// Evaluate `layer` on `input`, returning the signal the layer declared
    /// (see [`MonitoredLayer::signal`]) as a batch × feature snapshot.
    fn layer_output(&mut self, layer: &MonitoredLayer, input: &Snapshot, phase: Phase) -> Result<Snapshot>;
}

/// Saturation callback for a training loop.
///
/// # Example
///
/// ```rust
/// use delve::highlevel::{ModelProbe, Phase, SaturationMonitor};
/// use delve::kernel::Snapshot;
/// use delve::memory::{LayerDescriptor, MonitoredLayer};
/// use delve::{EpochRecord, Result, SaturationConfig};
///
/// /// Single linear layer `y = x · W` with W = [[1, 0], [0, 0.1]].
/// struct Linear;
///
/// impl ModelProbe for Linear {
///     fn layer_output(&mut self, _: &MonitoredLayer, x: &Snapshot, _: Phase) -> Result<Snapshot> {
///         let rows: Vec<Vec<f64>> = (0..x.rows())
///             .map(|r| vec![x[(r, 0)], 0.1 * x[(r, 1)]])
///             .collect();
///         Snapshot::from_rows(&rows)
///     }
/// }
///
/// let config = SaturationConfig::default().with_sample_rate(1);
/// let input = Snapshot::from_rows(&[vec![1.0, 1.0]]).unwrap();
/// let mut monitor = SaturationMonitor::new(input, config).unwrap();
/// monitor.on_training_start(&[LayerDescriptor::monitorable("dense")]);
///
/// for step in 0..5 {
///     monitor.on_step(step, &mut Linear);
/// }
/// let mut record = EpochRecord::new();
/// monitor.on_epoch_end_to(0, &mut record, &mut std::io::sink());
/// // the probe batch is fixed, so the layer output never varies
/// assert!(record.is_empty());
/// ```
#[derive(Debug)]
pub struct SaturationMonitor {
    input: Snapshot,
    buffer: SampleBuffer,
    estimator: SaturationEstimator,
}

impl SaturationMonitor {
    /// `input` is the probe batch, held fixed for the whole run.
    pub fn new(input: Snapshot, config: SaturationConfig) -> Result<Self> {
        let buffer = SampleBuffer::new(config.sample_rate)?;
        let estimator = SaturationEstimator::new(config)?;
        Ok(Self {
            input,
            buffer,
            estimator,
        })
    }

    pub fn config(&self) -> &SaturationConfig {
        self.estimator.config()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn input(&self) -> &Snapshot {
        &self.input
    }

    /// Select the monitorable layers and start with empty histories.
    pub fn on_training_start(&mut self, descriptors: &[LayerDescriptor]) -> Vec<MonitoredLayer> {
        let layers = select_monitored(descriptors);
        tracing::debug!(layers = layers.len(), "saturation monitor initialized");
        self.buffer.initialize(layers.iter().cloned());
        layers
    }

    /// Sample every monitored layer if `step` is on the cadence.
    ///
    /// Returns the number of snapshots recorded.
    pub fn on_step<P: ModelProbe + ?Sized>(&mut self, step: usize, probe: &mut P) -> usize {
        if !self.buffer.is_sampling_step(step) {
            return 0;
        }

        let mut outputs = Vec::with_capacity(self.buffer.layer_count());
        for layer in self.buffer.layers() {
            match probe.layer_output(layer, &self.input, Phase::Inference) {
                Ok(snapshot) => outputs.push((layer.name().to_string(), snapshot)),
                Err(e) => tracing::warn!(layer = %layer.name(), step, error = %e, "probe failed, skipping layer"),
            }
        }
        self.buffer.record_step(step, outputs)
    }

    /// Score the epoch, report to stdout on print epochs, merge into
    /// `record` and reset the buffer.
    pub fn on_epoch_end(&mut self, epoch: usize, record: &mut EpochRecord) -> BTreeMap<String, f64> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.on_epoch_end_to(epoch, record, &mut out)
    }

    /// Like [`on_epoch_end`](Self::on_epoch_end), writing the report to `out`.
    pub fn on_epoch_end_to<W: Write>(
        &mut self,
        epoch: usize,
        record: &mut EpochRecord,
        out: &mut W,
    ) -> BTreeMap<String, f64> {
        let report = self.estimator.score_all_to(&self.buffer, epoch, out);
        report.merge_into(record, self.estimator.config());
        self.buffer.reset();
        report.scores()
    }
}
