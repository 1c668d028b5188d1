//! Epoch reports and the host's per-epoch record.

use crate::config::{SaturationConfig, Statistic};
use crate::kernel::{EigenSpectrum, Estimate, SkipReason};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The host's per-epoch log record: key → JSON value, ordered by key.
pub type EpochRecord = Map<String, Value>;

/// Outcome for one layer at one epoch end.
#[derive(Clone, Debug)]
pub struct LayerReport {
    layer: String,
    spectrum: Result<EigenSpectrum, SkipReason>,
}

impl LayerReport {
    pub fn new(layer: impl Into<String>, spectrum: Result<EigenSpectrum, SkipReason>) -> Self {
        Self {
            layer: layer.into(),
            spectrum,
        }
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn estimate(&self) -> Estimate {
        self.spectrum.as_ref().map(EigenSpectrum::saturation).map_err(|r| *r).into()
    }

    pub fn spectrum(&self) -> Option<&EigenSpectrum> {
        self.spectrum.as_ref().ok()
    }
}

/// All layer outcomes of one epoch, in monitoring order.
#[derive(Clone, Debug)]
pub struct EpochReport {
    epoch: usize,
    layers: Vec<LayerReport>,
}

impl EpochReport {
    pub fn new(epoch: usize, layers: Vec<LayerReport>) -> Self {
        Self { epoch, layers }
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn layers(&self) -> &[LayerReport] {
        &self.layers
    }

    /// Layer name → saturation, omitting layers that were not scored.
    pub fn scores(&self) -> BTreeMap<String, f64> {
        self.layers
            .iter()
            .filter_map(|l| l.estimate().score().map(|s| (l.layer.clone(), s)))
            .collect()
    }

    /// Layers that were not scored and why.
    pub fn skipped(&self) -> Vec<(&str, SkipReason)> {
        self.layers
            .iter()
            .filter_map(|l| l.estimate().reason().map(|r| (l.layer.as_str(), r)))
            .collect()
    }

    /// `<layer> <score:.2>` for every scored layer.
    pub fn lines(&self) -> Vec<String> {
        self.layers
            .iter()
            .filter_map(|l| l.estimate().score().map(|s| format!("{} {:.2}", l.layer, s)))
            .collect()
    }

    /// Merge the configured statistics of every scored layer into `record`.
    ///
    /// Existing keys are overwritten. Skipped layers add nothing.
    pub fn merge_into(&self, record: &mut EpochRecord, config: &SaturationConfig) {
        for report in &self.layers {
            let Some(spectrum) = report.spectrum() else {
                continue;
            };
            let name = report.layer();

            let entries = [
                (Statistic::Saturation, Value::from(spectrum.saturation())),
                (Statistic::Eigendist, Value::from(spectrum.eigenvalues().to_vec())),
                (Statistic::Neigendist, Value::from(spectrum.explained_variance())),
                (Statistic::Spectrum, Value::from(spectrum.top(config.spectrum_top).to_vec())),
            ];
            for (stat, value) in entries {
                if let (true, Some(key)) = (config.wants(stat), stat.key(name)) {
                    record.insert(key, value);
                }
            }
        }
    }
}
