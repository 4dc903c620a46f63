//! Benchmarks for envelope automation.

use std::hint::black_box;

use alien_synth::Adsr;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let timeline = Adsr::new(0.1, 0.2, 0.7, 0.5).timeline(2.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (linear ramp)
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                timeline.render(black_box(&mut buffer), black_box(0.05), 48_000.0);
            })
        });

        // Sustain phase (holding steady)
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                timeline.render(black_box(&mut buffer), black_box(1.0), 48_000.0);
            })
        });

        // Release phase (ramping down)
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                timeline.render(black_box(&mut buffer), black_box(1.7), 48_000.0);
            })
        });
    }

    group.finish();
}
