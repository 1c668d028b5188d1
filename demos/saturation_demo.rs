//! Saturation Demo: watch hidden-layer saturation while a small MLP trains.
//!
//! A 6 → 8 → 1 network (tanh hidden layer) is fit by plain SGD to a target
//! that only depends on three input coordinates, while the hidden
//! pre-activations are sampled every 5 steps. Each epoch prints the
//! saturation of `hidden` and the merged epoch record.
//!
//! The output layer is linear, so it exposes its raw output.
//!
//! Run: cargo run --example saturation_demo --release

use delve::highlevel::{ModelProbe, Phase, SaturationMonitor};
use delve::kernel::Snapshot;
use delve::memory::{LayerDescriptor, MonitoredLayer, OutputSignal};
use delve::{DelveError, EpochRecord, Result, SaturationConfig};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const INPUTS: usize = 6;
const HIDDEN: usize = 8;
const BATCH: usize = 16;
const STEPS_PER_EPOCH: usize = 200;
const EPOCHS: usize = 8;
const LEARNING_RATE: f64 = 0.02;

// =============================================================================
// Model
// =============================================================================

struct Mlp {
    w1: Vec<[f64; INPUTS]>,
    b1: [f64; HIDDEN],
    w2: [f64; HIDDEN],
    b2: f64,
}

struct Forward {
    pre: [f64; HIDDEN],
    hidden: [f64; HIDDEN],
    out: f64,
}

impl Mlp {
    fn new(rng: &mut ChaCha8Rng) -> Self {
        let scale = 1.0 / (INPUTS as f64).sqrt();
        Self {
            w1: (0..HIDDEN)
                .map(|_| std::array::from_fn(|_| rng.gen_range(-scale..scale)))
                .collect(),
            b1: [0.0; HIDDEN],
            w2: std::array::from_fn(|_| rng.gen_range(-0.5..0.5)),
            b2: 0.0,
        }
    }

    fn forward(&self, x: &[f64]) -> Forward {
        let pre: [f64; HIDDEN] =
            std::array::from_fn(|h| self.b1[h] + self.w1[h].iter().zip(x).map(|(w, xi)| w * xi).sum::<f64>());
        let hidden = pre.map(f64::tanh);
        let out = self.b2 + self.w2.iter().zip(&hidden).map(|(w, h)| w * h).sum::<f64>();
        Forward { pre, hidden, out }
    }

    fn sgd_step(&mut self, xs: &[[f64; INPUTS]], ys: &[f64]) -> f64 {
        let mut loss = 0.0;
        for (x, &y) in xs.iter().zip(ys) {
            let f = self.forward(x);
            let err = f.out - y;
            loss += err * err;

            for h in 0..HIDDEN {
                let grad_pre = err * self.w2[h] * (1.0 - f.hidden[h] * f.hidden[h]);
                self.w2[h] -= LEARNING_RATE * err * f.hidden[h];
                for i in 0..INPUTS {
                    self.w1[h][i] -= LEARNING_RATE * grad_pre * x[i];
                }
                self.b1[h] -= LEARNING_RATE * grad_pre;
            }
            self.b2 -= LEARNING_RATE * err;
        }
        loss / xs.len() as f64
    }
}

impl ModelProbe for Mlp {
    fn layer_output(&mut self, layer: &MonitoredLayer, input: &Snapshot, _phase: Phase) -> Result<Snapshot> {
        // No dropout or batch norm: inference and training passes coincide.
        let rows: Vec<Vec<f64>> = (0..input.rows())
            .filter_map(|r| input.row(r))
            .map(|x| {
                let f = self.forward(x);
                match (layer.name(), layer.signal()) {
                    ("hidden", OutputSignal::PreActivation) => f.pre.to_vec(),
                    ("hidden", OutputSignal::RawOutput) => f.hidden.to_vec(),
                    _ => vec![f.out],
                }
            })
            .collect();
        if rows.is_empty() {
            return Err(DelveError::Probe {
                layer: layer.name().to_string(),
                message: "empty probe batch".into(),
            });
        }
        Snapshot::from_rows(&rows)
    }
}

// =============================================================================
// Data
// =============================================================================

fn target(x: &[f64; INPUTS]) -> f64 {
    (x[0] + 0.5 * x[1]).sin() + 0.3 * x[2] * x[2]
}

fn batch(rng: &mut ChaCha8Rng) -> (Vec<[f64; INPUTS]>, Vec<f64>) {
    let xs: Vec<[f64; INPUTS]> = (0..BATCH)
        .map(|_| std::array::from_fn(|_| rng.gen_range(-1.5..1.5)))
        .collect();
    let ys = xs.iter().map(target).collect();
    (xs, ys)
}

fn main() -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("Layer saturation during training");
    println!("{}", "=".repeat(60));

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut model = Mlp::new(&mut rng);

    // Fixed probe batch for the whole run.
    let probe_rows: Vec<Vec<f64>> = (0..BATCH)
        .map(|_| (0..INPUTS).map(|_| rng.gen_range(-1.5..1.5)).collect())
        .collect();
    let probe = Snapshot::from_rows(&probe_rows)?;

    let config = SaturationConfig::default().with_sample_rate(5);
    let mut monitor = SaturationMonitor::new(probe, config)?;
    let layers = monitor.on_training_start(&[
        LayerDescriptor::new("input"),
        LayerDescriptor::monitorable("hidden"),
        LayerDescriptor::new("output").with_identity_activation(),
    ]);
    println!("monitoring: {:?}\n", layers.iter().map(|l| l.name()).collect::<Vec<_>>());

    for epoch in 0..EPOCHS {
        let mut loss = 0.0;
        for step in 0..STEPS_PER_EPOCH {
            let (xs, ys) = batch(&mut rng);
            loss += model.sgd_step(&xs, &ys);
            monitor.on_step(step, &mut model);
        }

        let mut record = EpochRecord::new();
        record.insert("loss".into(), (loss / STEPS_PER_EPOCH as f64).into());
        println!("epoch {}", epoch);
        monitor.on_epoch_end(epoch, &mut record);
        println!("  record: {}\n", serde_json::Value::Object(record));
    }

    Ok(())
}
