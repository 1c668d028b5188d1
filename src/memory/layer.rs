//! Layer descriptions supplied by the host.
//!
//! The host describes every layer of its model with a [`LayerDescriptor`];
//! the ones tagged monitorable become [`MonitoredLayer`]s. Which signal a
//! layer exposes is declared once here, never inferred at sampling time.

use serde::{Deserialize, Serialize};

/// Which of a layer's two outputs is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSignal {
    /// Linear output before the nonlinearity.
    PreActivation,
    /// The layer's output as-is. Identical to `PreActivation` for identity activations.
    RawOutput,
}

impl OutputSignal {
    /// Pre-activation for layers with a nonlinearity, raw output otherwise.
    pub fn for_activation(identity_activation: bool) -> Self {
        if identity_activation {
            OutputSignal::RawOutput
        } else {
            OutputSignal::PreActivation
        }
    }
}

/// What the host reports about one layer of its model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    /// Capability tag: should this layer be watched?
    #[serde(default)]
    pub is_monitorable: bool,
    /// True if the layer's activation is the identity function.
    #[serde(default)]
    pub identity_activation: bool,
}

impl LayerDescriptor {
    /// A non-monitorable layer with a nonlinearity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_monitorable: false,
            identity_activation: false,
        }
    }

    /// A monitorable layer with a nonlinearity.
    pub fn monitorable(name: impl Into<String>) -> Self {
        Self {
            is_monitorable: true,
            ..Self::new(name)
        }
    }

    pub fn with_identity_activation(mut self) -> Self {
        self.identity_activation = true;
        self
    }
}

/// A hidden layer under observation. Fixed for the lifetime of a run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitoredLayer {
    name: String,
    signal: OutputSignal,
}

impl MonitoredLayer {
    pub fn new(name: impl Into<String>, signal: OutputSignal) -> Self {
        Self {
            name: name.into(),
            signal,
        }
    }

    /// `None` unless the descriptor is tagged monitorable.
    pub fn from_descriptor(desc: &LayerDescriptor) -> Option<Self> {
        desc.is_monitorable.then(|| {
            Self::new(
                desc.name.clone(),
                OutputSignal::for_activation(desc.identity_activation),
            )
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signal(&self) -> OutputSignal {
        self.signal
    }
}

/// Select the monitorable layers, in model order, dropping repeated names.
pub fn select_monitored(descriptors: &[LayerDescriptor]) -> Vec<MonitoredLayer> {
    let mut selected: Vec<MonitoredLayer> = Vec::new();
    for layer in descriptors.iter().filter_map(MonitoredLayer::from_descriptor) {
        if selected.iter().any(|l| l.name == layer.name) {
            tracing::warn!(layer = %layer.name, "duplicate layer name, keeping first");
            continue;
        }
        selected.push(layer);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_follows_declared_activation() {
        assert_eq!(OutputSignal::for_activation(false), OutputSignal::PreActivation);
        assert_eq!(OutputSignal::for_activation(true), OutputSignal::RawOutput);

        let linear = LayerDescriptor::monitorable("out").with_identity_activation();
        let layer = MonitoredLayer::from_descriptor(&linear).unwrap();
        assert_eq!(layer.signal(), OutputSignal::RawOutput);
    }

    #[test]
    fn test_select_by_tag_not_name() {
        let descriptors = vec![
            LayerDescriptor::new("dense_input"),
            LayerDescriptor::monitorable("hidden_a"),
            LayerDescriptor::new("dropout"),
            LayerDescriptor::monitorable("hidden_b").with_identity_activation(),
            LayerDescriptor::monitorable("hidden_a"),
        ];
        let selected = select_monitored(&descriptors);
        let names: Vec<&str> = selected.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["hidden_a", "hidden_b"]);
        assert_eq!(selected[0].signal(), OutputSignal::PreActivation);
        assert_eq!(selected[1].signal(), OutputSignal::RawOutput);
    }

    #[test]
    fn test_descriptor_json_defaults() {
        let desc: LayerDescriptor = serde_json::from_str(r#"{"name": "fc1"}"#).unwrap();
        assert_eq!(desc, LayerDescriptor::new("fc1"));
        assert!(MonitoredLayer::from_descriptor(&desc).is_none());
    }
}
