//! Benchmarks for formula compilation and wavetable synthesis.
//!
//! Both run on the control thread when a note starts, not per block.

use std::hint::black_box;

use alien_synth::dsp::wavetable::PeriodicWave;
use alien_synth::formula::compile;
use criterion::Criterion;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");

    group.bench_function("compile_48k", |b| {
        b.iter(|| compile(black_box("sin(2 * pi * t) * exp(-t)"), 48_000));
    });

    let compiled = compile("sin(2 * pi * t)", 48_000).expect("formula compiles");
    let limit = PeriodicWave::harmonic_limit(48_000.0, 220.0);
    group.bench_function("build_220hz", |b| {
        b.iter(|| PeriodicWave::from_compiled(black_box(&compiled), limit));
    });

    group.finish();
}
