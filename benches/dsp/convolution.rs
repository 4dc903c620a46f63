//! Benchmarks for the partitioned convolution reverb.
//!
//! The cost per block grows with the number of partitions, so the small
//! block sizes are the expensive ones for a 2 second impulse response.

use std::hint::black_box;

use alien_synth::dsp::{convolution::Convolver, impulse::ImpulseResponse};
use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

use crate::BLOCK_SIZES;

pub fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolution");
    group.sample_size(20);

    let mut rng = StdRng::seed_from_u64(42);
    let ir = ImpulseResponse::synthesize(2.0, 48_000, &mut rng);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut convolver = Convolver::new(&ir, size, true);
        group.bench_with_input(BenchmarkId::new("stereo_2s", size), &size, |b, _| {
            b.iter(|| {
                convolver.process_block(black_box(&input), &mut left, &mut right);
            })
        });
    }

    // Construction: FFT of every partition, done once per engine
    group.bench_function("build_2s", |b| {
        b.iter(|| Convolver::new(black_box(&ir), 256, true));
    });

    group.finish();
}
