//! Benchmarks for delve operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use delve::kernel::{Covariance, EigenSpectrum};
use delve::{MonitoredLayer, OutputSignal, SampleBuffer, SaturationEstimator, Snapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_history(n: usize, batch: usize, features: usize) -> Vec<Snapshot> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let data = (0..batch * features).map(|_| rng.gen_range(-1.0..1.0)).collect();
            Snapshot::from_flat(batch, features, data).unwrap()
        })
        .collect()
}

fn benchmark_covariance(c: &mut Criterion) {
    let history = random_history(200, 32, 64);

    c.bench_function("covariance_200x64", |b| {
        b.iter(|| Covariance::from_history(black_box(&history)))
    });
}

fn benchmark_spectrum(c: &mut Criterion) {
    let history = random_history(200, 32, 64);
    let cov = Covariance::from_history(&history).unwrap();

    c.bench_function("eigenspectrum_64", |b| {
        b.iter(|| EigenSpectrum::from_covariance(black_box(&cov)))
    });
}

fn benchmark_score_layer(c: &mut Criterion) {
    let estimator = SaturationEstimator::default();
    let small = random_history(100, 32, 16);
    let large = random_history(400, 32, 128);

    c.bench_function("score_layer_16", |b| {
        b.iter(|| estimator.score_layer(black_box(&small)))
    });
    c.bench_function("score_layer_128", |b| {
        b.iter(|| estimator.score_layer(black_box(&large)))
    });
}

fn benchmark_record_step(c: &mut Criterion) {
    let snapshot = random_history(1, 32, 128).remove(0);
    let mut buffer = SampleBuffer::new(1).unwrap();
    buffer.initialize([MonitoredLayer::new("dense", OutputSignal::PreActivation)]);

    c.bench_function("record_step", |b| {
        b.iter(|| {
            if buffer.len("dense") >= 1000 {
                buffer.reset();
            }
            buffer.record_step(0, [("dense", black_box(snapshot.clone()))])
        })
    });
}

criterion_group!(
    benches,
    benchmark_covariance,
    benchmark_spectrum,
    benchmark_score_layer,
    benchmark_record_step,
);
criterion_main!(benches);
