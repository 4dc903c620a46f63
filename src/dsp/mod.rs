//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Everything in here that runs per block is allocation-free and
//! realtime-safe. Construction (wavetables, impulse responses, convolver
//! spectra) allocates and belongs on the control thread.

/// Web Audio style parameter automation timelines.
pub mod automation;
/// Uniformly partitioned FFT convolution, mono in, stereo out.
pub mod convolution;
/// Circular-buffer delay line.
pub mod delay;
/// Scheduled attack/decay/sustain/release envelope.
pub mod envelope;
/// Synthetic decaying-noise impulse responses.
pub mod impulse;
/// Phase-accumulator oscillator.
pub mod oscillator;
/// Band-limited periodic waves from harmonic coefficients.
pub mod wavetable;

pub use automation::ParamTimeline;
pub use envelope::Adsr;
pub use oscillator::Waveform;
