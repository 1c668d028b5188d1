//! Per-layer sample buffer for one epoch.
//!
//! The buffer moves through `Uninitialized → Accumulating`, and each epoch
//! end is a drain followed by [`SampleBuffer::reset`], which returns it to an
//! empty `Accumulating` state with the same layer universe.
//!
//! A snapshot is accepted only if it can be stacked with what the layer
//! already holds: at least one row and the same feature count. Once
//! accepted it stays until `reset`.

use super::layer::MonitoredLayer;
use crate::error::{DelveError, Result};
use crate::kernel::Snapshot;
use std::collections::HashMap;

/// Default number of training steps between samples.
pub const DEFAULT_SAMPLE_RATE: usize = 10;

/// Ordered snapshots of one layer for the current epoch.
#[derive(Clone, Debug)]
pub struct EpochHistory {
    layer: MonitoredLayer,
    snapshots: Vec<Snapshot>,
}

impl EpochHistory {
    pub fn new(layer: MonitoredLayer) -> Self {
        Self {
            layer,
            snapshots: Vec::new(),
        }
    }

    pub fn layer(&self) -> &MonitoredLayer {
        &self.layer
    }

    /// Snapshots in training-step order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Feature count fixed by the first accepted snapshot.
    pub fn features(&self) -> Option<usize> {
        self.snapshots.first().map(Snapshot::cols)
    }

    fn push(&mut self, snapshot: Snapshot) -> bool {
        if snapshot.rows() == 0 {
            tracing::warn!(layer = %self.layer.name(), "rejecting snapshot with no rows");
            return false;
        }
        if let Some(expected) = self.features() {
            if snapshot.cols() != expected {
                tracing::warn!(
                    layer = %self.layer.name(),
                    expected,
                    got = snapshot.cols(),
                    "rejecting snapshot with mismatched feature count"
                );
                return false;
            }
        }
        self.snapshots.push(snapshot);
        true
    }

    fn clear(&mut self) {
        self.snapshots.clear();
    }
}

/// Holds the growing [`EpochHistory`] of every monitored layer.
///
/// # Example
///
/// ```rust
/// use delve::kernel::Snapshot;
/// use delve::memory::{MonitoredLayer, OutputSignal, SampleBuffer};
///
/// let mut buffer = SampleBuffer::new(10).unwrap();
/// buffer.initialize([MonitoredLayer::new("hidden", OutputSignal::PreActivation)]);
///
/// for step in 0..25 {
///     let snap = Snapshot::zeros(4, 3);
///     buffer.record_step(step, [("hidden", snap)]);
/// }
/// // steps 0, 10 and 20
/// assert_eq!(buffer.drain("hidden").len(), 3);
///
/// buffer.reset();
/// assert!(buffer.drain("hidden").is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    sample_rate: usize,
    histories: Vec<EpochHistory>,
    /// layer name -> position in `histories`
    index: HashMap<String, usize>,
    initialized: bool,
}

impl SampleBuffer {
    /// Create an uninitialized buffer sampling every `sample_rate` steps.
    pub fn new(sample_rate: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DelveError::InvalidConfig(
                "sample_rate must be at least 1".into(),
            ));
        }
        Ok(Self {
            sample_rate,
            histories: Vec::new(),
            index: HashMap::new(),
            initialized: false,
        })
    }

    /// Define the universe of tracked layers, each with an empty history.
    ///
    /// Calling this again starts a new run and discards everything held.
    pub fn initialize<I>(&mut self, layers: I)
    where
        I: IntoIterator<Item = MonitoredLayer>,
    {
        self.histories.clear();
        self.index.clear();
        for layer in layers {
            if self.index.contains_key(layer.name()) {
                tracing::warn!(layer = %layer.name(), "layer already tracked, ignoring duplicate");
                continue;
            }
            self.index.insert(layer.name().to_string(), self.histories.len());
            self.histories.push(EpochHistory::new(layer));
        }
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    /// True if `step` falls on the sampling cadence.
    pub fn is_sampling_step(&self, step: usize) -> bool {
        step % self.sample_rate == 0
    }

    /// Append each layer's snapshot if `step` is a sampling step.
    ///
    /// Layers outside the initialized universe are ignored. Returns the number
    /// of snapshots appended.
    pub fn record_step<I, S>(&mut self, step: usize, outputs: I) -> usize
    where
        I: IntoIterator<Item = (S, Snapshot)>,
        S: AsRef<str>,
    {
        if !self.is_sampling_step(step) {
            return 0;
        }
        if !self.initialized {
            tracing::warn!(step, "record_step called before initialize, nothing recorded");
            return 0;
        }

        let mut appended = 0;
        for (name, snapshot) in outputs {
            let name = name.as_ref();
            match self.index.get(name) {
                Some(&i) => {
                    if self.histories[i].push(snapshot) {
                        appended += 1;
                    }
                }
                None => tracing::debug!(layer = %name, step, "ignoring untracked layer"),
            }
        }
        appended
    }

    /// The layer's snapshots for this epoch, in step order.
    ///
    /// Does not clear. Unknown layers yield an empty slice.
    pub fn drain(&self, layer: &str) -> &[Snapshot] {
        self.history(layer).map(EpochHistory::snapshots).unwrap_or(&[])
    }

    pub fn history(&self, layer: &str) -> Option<&EpochHistory> {
        self.index.get(layer).map(|&i| &self.histories[i])
    }

    /// All histories in initialization order.
    pub fn histories(&self) -> impl Iterator<Item = &EpochHistory> {
        self.histories.iter()
    }

    /// Tracked layers in initialization order.
    pub fn layers(&self) -> impl Iterator<Item = &MonitoredLayer> {
        self.histories.iter().map(EpochHistory::layer)
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.index.contains_key(layer)
    }

    /// Number of snapshots held for `layer`.
    pub fn len(&self, layer: &str) -> usize {
        self.drain(layer).len()
    }

    /// Number of tracked layers.
    pub fn layer_count(&self) -> usize {
        self.histories.len()
    }

    /// True if no snapshot is held for any layer.
    pub fn is_empty(&self) -> bool {
        self.histories.iter().all(EpochHistory::is_empty)
    }

    /// Clear every history, keeping the layer universe.
    pub fn reset(&mut self) {
        for history in &mut self.histories {
            history.clear();
        }
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            histories: Vec::new(),
            index: HashMap::new(),
            initialized: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::OutputSignal;

    fn layer(name: &str) -> MonitoredLayer {
        MonitoredLayer::new(name, OutputSignal::PreActivation)
    }

    fn filled(value: f64, rows: usize, cols: usize) -> Snapshot {
        Snapshot::from_flat(rows, cols, vec![value; rows * cols]).unwrap()
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(matches!(SampleBuffer::new(0), Err(DelveError::InvalidConfig(_))));
        assert_eq!(SampleBuffer::default().sample_rate(), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_cadence() {
        let mut buffer = SampleBuffer::new(10).unwrap();
        buffer.initialize([layer("a")]);

        for step in 0..=20 {
            let appended = buffer.record_step(step, [("a", filled(step as f64, 2, 3))]);
            let expected = if step % 10 == 0 { 1 } else { 0 };
            assert_eq!(appended, expected, "step {}", step);
        }

        let history = buffer.drain("a");
        assert_eq!(history.len(), 3);
        // step order preserved
        let firsts: Vec<f64> = history.iter().map(|s| s[(0, 0)]).collect();
        assert_eq!(firsts, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_untracked_layer_ignored() {
        let mut buffer = SampleBuffer::new(1).unwrap();
        buffer.initialize([layer("a")]);

        let appended = buffer.record_step(0, [("a", filled(1.0, 1, 2)), ("ghost", filled(1.0, 1, 2))]);
        assert_eq!(appended, 1);
        assert!(!buffer.contains("ghost"));
        assert!(buffer.drain("ghost").is_empty());
        assert_eq!(buffer.layer_count(), 1);
    }

    #[test]
    fn test_record_before_initialize_is_noop() {
        let mut buffer = SampleBuffer::new(1).unwrap();
        assert!(!buffer.is_initialized());
        assert_eq!(buffer.record_step(0, [("a", filled(1.0, 1, 2))]), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_unstackable_snapshots_rejected() {
        let mut buffer = SampleBuffer::new(1).unwrap();
        buffer.initialize([layer("a")]);

        assert_eq!(buffer.record_step(0, [("a", Snapshot::zeros(0, 3))]), 0);
        assert_eq!(buffer.record_step(1, [("a", filled(1.0, 2, 3))]), 1);
        assert_eq!(buffer.record_step(2, [("a", filled(1.0, 2, 4))]), 0);
        // batch size may vary; feature count may not
        assert_eq!(buffer.record_step(3, [("a", filled(2.0, 5, 3))]), 1);
        assert_eq!(buffer.len("a"), 2);
        assert_eq!(buffer.history("a").unwrap().features(), Some(3));
    }

    #[test]
    fn test_reset_clears_every_layer() {
        let mut buffer = SampleBuffer::new(1).unwrap();
        buffer.initialize([layer("a"), layer("b")]);
        for step in 0..4 {
            buffer.record_step(step, vec![("a", filled(1.0, 1, 2)), ("b", filled(2.0, 1, 5))]);
        }
        assert_eq!(buffer.len("a"), 4);
        assert_eq!(buffer.len("b"), 4);

        buffer.reset();
        for l in ["a", "b"] {
            assert!(buffer.drain(l).is_empty());
        }
        // universe survives reset
        let names: Vec<&str> = buffer.layers().map(|l| l.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(buffer.is_initialized());

        // feature count can change across epochs
        assert_eq!(buffer.record_step(0, [("b", filled(1.0, 1, 7))]), 1);
    }

    #[test]
    fn test_duplicate_layers_tracked_once() {
        let mut buffer = SampleBuffer::new(1).unwrap();
        buffer.initialize([layer("a"), layer("a"), layer("b")]);
        assert_eq!(buffer.layer_count(), 2);
    }

    #[test]
    fn test_accepts_owned_names() {
        let mut buffer = SampleBuffer::new(2).unwrap();
        buffer.initialize([layer("a")]);
        let mut outputs = HashMap::new();
        outputs.insert("a".to_string(), filled(0.5, 3, 2));
        assert_eq!(buffer.record_step(4, outputs), 1);
    }
}
