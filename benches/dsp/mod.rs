//! Benchmarks for low-level DSP primitives.

mod convolution;
mod delay;
mod envelope;
mod oscillator;
mod wavetable;

pub use convolution::bench_convolution;
pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
pub use wavetable::bench_wavetable;
