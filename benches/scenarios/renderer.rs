//! Benchmarks for a whole note through the renderer.
//!
//! Each iteration is one device callback worth of frames: LFO, voice,
//! master gain, delay and convolution reverb.

use std::hint::black_box;

use alien_synth::{EngineConfig, SynthEngine, SynthParams};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/renderer");
    group.sample_size(20);

    let presets = [
        ("single", SynthParams::default()),
        ("two_osc_vibrato", SynthParams::two_oscillator_preset()),
    ];

    for &size in BLOCK_SIZES {
        for (name, params) in &presets {
            let params = SynthParams {
                // Long enough not to end mid-benchmark
                duration_seconds: 3_600.0,
                ..params.clone()
            };
            let config = EngineConfig::offline(48_000)
                .with_seed(1)
                .with_block_size(size);
            let (mut engine, mut renderer) = SynthEngine::new(config).expect("engine");
            engine.start(&params).expect("start");

            let mut data = vec![0.0f32; size * 2];
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    renderer.fill_interleaved(black_box(&mut data), 2);
                })
            });
        }
    }

    group.finish();
}
