use std::{f64::consts::TAU, sync::Arc};

use crate::dsp::wavetable::PeriodicWave;

/// What an oscillator reads each cycle from.
#[derive(Clone)]
pub enum Waveform {
    /// `sin(2π·phase)`, computed directly.
    Sine,
    /// A band-limited single-cycle table.
    Periodic(Arc<PeriodicWave>),
}

impl Waveform {
    #[inline]
    pub fn sample(&self, phase: f64) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin() as f32,
            Waveform::Periodic(wave) => wave.sample(phase),
        }
    }

    pub fn is_sine(&self) -> bool {
        matches!(self, Waveform::Sine)
    }
}

impl std::fmt::Debug for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Waveform::Sine => f.write_str("Sine"),
            Waveform::Periodic(wave) => write!(f, "Periodic({} harmonics)", wave.harmonics()),
        }
    }
}

/// Convert a detune in cents to a frequency ratio.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f64 {
    2f64.powf(f64::from(cents) / 1200.0)
}

/// Phase-accumulator oscillator.
///
/// Phase is kept in cycles (`[0, 1)`) as `f64` so long notes don't drift.
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f64,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Render at a constant frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f64, sample_rate: f32) {
        let increment = frequency / f64::from(sample_rate);
        for sample in out.iter_mut() {
            *sample = self.waveform.sample(self.phase);
            self.advance(increment);
        }
    }

    /// Render with per-sample frequency modulation:
    /// `f[i] = (base + fm[i]) × ratio`.
    pub fn render_modulated(
        &mut self,
        out: &mut [f32],
        base: f32,
        fm: &[f32],
        ratio: f64,
        sample_rate: f32,
    ) {
        debug_assert!(fm.len() >= out.len());
        let inv_rate = 1.0 / f64::from(sample_rate);
        for (sample, &offset) in out.iter_mut().zip(fm) {
            *sample = self.waveform.sample(self.phase);
            let frequency = f64::from(base + offset) * ratio;
            self.advance(frequency * inv_rate);
        }
    }

    #[inline]
    fn advance(&mut self, increment: f64) {
        self.phase = (self.phase + increment).rem_euclid(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_starts_at_zero_phase() {
        let mut osc = OscillatorBlock::sine();
        let mut out = [0.0f32; 4];
        osc.render(&mut out, 1_000.0, 4_000.0);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 1.0).abs() < 1e-6);
        assert!(out[2].abs() < 1e-6);
        assert!((out[3] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn phase_continues_across_blocks() {
        let mut whole = OscillatorBlock::sine();
        let mut split = OscillatorBlock::sine();
        let mut a = vec![0.0f32; 256];
        whole.render(&mut a, 220.0, 48_000.0);

        let mut b = vec![0.0f32; 256];
        let (first, second) = b.split_at_mut(100);
        split.render(first, 220.0, 48_000.0);
        split.render(second, 220.0, 48_000.0);

        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_modulation_matches_constant_frequency() {
        let mut plain = OscillatorBlock::sine();
        let mut modulated = OscillatorBlock::sine();
        let mut a = vec![0.0f32; 512];
        let mut b = vec![0.0f32; 512];
        plain.render(&mut a, 220.0, 48_000.0);
        modulated.render_modulated(&mut b, 220.0, &[0.0; 512], 1.0, 48_000.0);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn octave_of_detune_doubles_frequency() {
        assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-12);
        assert!((cents_to_ratio(-1200.0) - 0.5).abs() < 1e-12);
        assert_eq!(cents_to_ratio(0.0), 1.0);

        let mut detuned = OscillatorBlock::sine();
        let mut reference = OscillatorBlock::sine();
        let mut a = vec![0.0f32; 300];
        let mut b = vec![0.0f32; 300];
        detuned.render_modulated(&mut a, 100.0, &[0.0; 300], cents_to_ratio(1200.0), 8_000.0);
        reference.render(&mut b, 200.0, 8_000.0);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn modulation_shifts_frequency_per_sample() {
        let mut osc = OscillatorBlock::sine();
        let mut out = [0.0f32; 2];
        // 0 Hz base + 1000 Hz offset at 4 kHz: a quarter cycle per sample
        osc.render_modulated(&mut out, 0.0, &[1_000.0, 1_000.0], 1.0, 4_000.0);
        assert!((osc.phase() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn periodic_waveform_reads_table() {
        let wave = Arc::new(PeriodicWave::from_coefficients(&[0.0, 0.0], &[0.0, 1.0], 16));
        let mut osc = OscillatorBlock::new(Waveform::Periodic(wave));
        let mut out = [0.0f32; 4];
        osc.render(&mut out, 1_000.0, 4_000.0);
        assert!(out[0].abs() < 1e-3);
        assert!((out[1] - 1.0).abs() < 1e-3);
    }
}
