//! Benchmarks for oscillator waveform generation.

use std::{hint::black_box, sync::Arc};

use alien_synth::dsp::{
    oscillator::{OscillatorBlock, Waveform},
    wavetable::PeriodicWave,
};
use alien_synth::formula::compile;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let compiled = compile("sin(2 * pi * t)", 48_000).expect("formula compiles");
    let wave = Arc::new(PeriodicWave::from_compiled(
        &compiled,
        PeriodicWave::harmonic_limit(48_000.0, 220.0),
    ));

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        // 1 Hz vibrato, 10 Hz deep, frozen for the block
        let fm: Vec<f32> = (0..size)
            .map(|i| 10.0 * (i as f32 / 48_000.0 * std::f32::consts::TAU).sin())
            .collect();

        // Sine - uses sin() transcendental function
        let mut osc = OscillatorBlock::sine();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(220.0), 48_000.0);
            })
        });

        // Periodic - table lookup with linear interpolation
        let mut osc = OscillatorBlock::new(Waveform::Periodic(Arc::clone(&wave)));
        group.bench_with_input(BenchmarkId::new("periodic", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(220.0), 48_000.0);
            })
        });

        // Periodic with per-sample frequency modulation and detune
        let mut osc = OscillatorBlock::new(Waveform::Periodic(Arc::clone(&wave)));
        group.bench_with_input(BenchmarkId::new("periodic_fm", size), &size, |b, _| {
            b.iter(|| {
                osc.render_modulated(
                    black_box(&mut buffer),
                    220.0,
                    black_box(&fm),
                    1.003,
                    48_000.0,
                );
            })
        });
    }

    group.finish();
}
