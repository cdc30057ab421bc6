use std::time::{Duration, Instant};

use behavior::{BehaviorMonitor, SignalExtractor};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use detector_backend::SyntheticFace;

fn bench_extract(c: &mut Criterion) {
    let extractor = SignalExtractor::default();
    let landmarks = SyntheticFace::frontal().yaw(0.2).roll(5.0).landmarks();

    c.bench_function("signal_extract", |b| {
        b.iter(|| extractor.extract(black_box(&landmarks)))
    });
}

fn bench_observe(c: &mut Criterion) {
    let faces = [
        SyntheticFace::frontal().landmarks(),
        SyntheticFace::frontal().yaw(0.4).landmarks(),
    ];
    let mut monitor = BehaviorMonitor::default();
    let mut now = Instant::now();
    let mut i = 0usize;

    c.bench_function("behavior_observe", |b| {
        b.iter(|| {
            i += 1;
            now += Duration::from_millis(700);
            monitor.observe(black_box(&faces[(i / 3) % 2]), now)
        })
    });
}

criterion_group!(benches, bench_extract, bench_observe);
criterion_main!(benches);
