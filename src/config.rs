//! Monitor configuration.
//!
//! ```rust
//! use delve::{SaturationConfig, Statistic};
//!
//! let config = SaturationConfig::from_json(r#"{"sample_rate": 5, "stats": ["spectral"]}"#).unwrap();
//! assert_eq!(config.sample_rate, 5);
//! assert_eq!(config.print_freq, 1);
//! assert!(config.wants(Statistic::Spectrum));
//! assert!(!config.wants(Statistic::Saturation));
//! ```

use crate::error::{DelveError, Result};
use crate::memory::DEFAULT_SAMPLE_RATE;
use serde::{Deserialize, Serialize};

/// Default number of epochs between textual reports.
pub const DEFAULT_PRINT_FREQ: usize = 1;

/// Default number of eigenvalues kept by [`Statistic::Spectrum`].
pub const DEFAULT_SPECTRUM_TOP: usize = 10;

/// Per-layer statistics merged into the epoch record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Concentration index of the normalized spectrum, stored under `<layer>`.
    #[serde(alias = "lsat")]
    Saturation,
    /// Absolute eigenvalues, descending, under `<layer>-eigendist`.
    Eigendist,
    /// Eigenvalues divided by their sum, under `<layer>-neigendist`.
    Neigendist,
    /// Top-N eigenvalues, under `<layer>-spectrum`.
    Spectrum,
    /// Shorthand for `eigendist`, `neigendist` and `spectrum`.
    Spectral,
}

impl Statistic {
    /// Record key suffix, `None` for saturation which uses the bare layer name.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Statistic::Saturation => None,
            Statistic::Eigendist => Some("eigendist"),
            Statistic::Neigendist => Some("neigendist"),
            Statistic::Spectrum => Some("spectrum"),
            Statistic::Spectral => None,
        }
    }

    /// Record key for `layer`.
    ///
    /// `None` for [`Spectral`](Statistic::Spectral): it only selects the
    /// other spectral stats and has no entry of its own.
    pub fn key(&self, layer: &str) -> Option<String> {
        match (self, self.suffix()) {
            (Statistic::Spectral, _) => None,
            (_, Some(suffix)) => Some(format!("{}-{}", layer, suffix)),
            (_, None) => Some(layer.to_string()),
        }
    }
}

/// Configuration for sampling, reporting and statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaturationConfig {
    /// Training steps between samples.
    pub sample_rate: usize,
    /// Epochs between textual reports.
    pub print_freq: usize,
    /// Statistics merged into the epoch record.
    pub stats: Vec<Statistic>,
    /// Eigenvalues kept by [`Statistic::Spectrum`].
    pub spectrum_top: usize,
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            print_freq: DEFAULT_PRINT_FREQ,
            stats: vec![Statistic::Saturation],
            spectrum_top: DEFAULT_SPECTRUM_TOP,
        }
    }
}

impl SaturationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_sample_rate(mut self, sample_rate: usize) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_print_freq(mut self, print_freq: usize) -> Self {
        self.print_freq = print_freq;
        self
    }

    pub fn with_stats(mut self, stats: impl IntoIterator<Item = Statistic>) -> Self {
        self.stats = stats.into_iter().collect();
        self
    }

    pub fn with_spectrum_top(mut self, top: usize) -> Self {
        self.spectrum_top = top;
        self
    }

    /// Reject zero cadences.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(DelveError::InvalidConfig(
                "sample_rate must be at least 1".into(),
            ));
        }
        if self.print_freq == 0 {
            return Err(DelveError::InvalidConfig(
                "print_freq must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// True if `stat` is requested, directly or through [`Statistic::Spectral`].
    pub fn wants(&self, stat: Statistic) -> bool {
        self.stats.iter().any(|s| {
            *s == stat
                || (*s == Statistic::Spectral
                    && matches!(
                        stat,
                        Statistic::Eigendist | Statistic::Neigendist | Statistic::Spectrum
                    ))
        })
    }

    /// True if `epoch` is a reporting epoch.
    pub fn is_print_epoch(&self, epoch: usize) -> bool {
        epoch % self.print_freq.max(1) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SaturationConfig::default();
        assert_eq!(config.sample_rate, 10);
        assert_eq!(config.print_freq, 1);
        assert_eq!(config.stats, vec![Statistic::Saturation]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SaturationConfig::from_json(r#"{"print_freq": 3}"#).unwrap();
        assert_eq!(config.sample_rate, 10);
        assert_eq!(config.print_freq, 3);
        assert!(config.is_print_epoch(6));
        assert!(!config.is_print_epoch(7));
    }

    #[test]
    fn test_from_json_rejects_zero_cadence() {
        let err = SaturationConfig::from_json(r#"{"sample_rate": 0}"#).unwrap_err();
        assert!(matches!(err, DelveError::InvalidConfig(_)));

        let err = SaturationConfig::from_json(r#"{"print_freq": 0}"#).unwrap_err();
        assert!(matches!(err, DelveError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_bad_input() {
        let err = SaturationConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, DelveError::JsonParse(_)));

        let err = SaturationConfig::from_json(r#"{"stats": ["bogus"]}"#).unwrap_err();
        assert!(matches!(err, DelveError::JsonParse(_)));
    }

    #[test]
    fn test_stat_names_and_keys() {
        let config = SaturationConfig::from_json(r#"{"stats": ["lsat", "neigendist"]}"#).unwrap();
        assert!(config.wants(Statistic::Saturation));
        assert!(config.wants(Statistic::Neigendist));
        assert!(!config.wants(Statistic::Eigendist));

        assert_eq!(Statistic::Saturation.key("dense_1").as_deref(), Some("dense_1"));
        assert_eq!(Statistic::Spectrum.key("dense_1").as_deref(), Some("dense_1-spectrum"));
    }

    #[test]
    fn test_spectral_has_no_key() {
        assert_eq!(Statistic::Spectral.key("dense_1"), None);
        let keys: Vec<String> = [
            Statistic::Saturation,
            Statistic::Eigendist,
            Statistic::Neigendist,
            Statistic::Spectrum,
        ]
        .iter()
        .filter_map(|stat| stat.key("dense_1"))
        .collect();
        assert_eq!(keys.len(), 4);
        assert!(keys.iter().all(|k| keys.iter().filter(|o| *o == k).count() == 1));
    }

    #[test]
    fn test_spectral_expands() {
        let config = SaturationConfig::new().with_stats([Statistic::Spectral]);
        assert!(config.wants(Statistic::Eigendist));
        assert!(config.wants(Statistic::Neigendist));
        assert!(config.wants(Statistic::Spectrum));
        assert!(!config.wants(Statistic::Saturation));
    }
}
