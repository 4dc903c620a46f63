use rustfft::{num_complex::Complex, FftPlanner};

use crate::formula::CompiledWaveform;

/*
Periodic Waves from Harmonic Coefficients
=========================================

A periodic wave is described by the strength of each of its harmonics
rather than by its samples:

    x(φ) = Σ  real[k]·cos(2πkφ) + imag[k]·sin(2πkφ)      k = 1, 2, 3, ...

where φ ∈ [0, 1) is the oscillator phase. Index 0 would be a DC offset and
is ignored, the same way Web Audio's PeriodicWave ignores it.

Building the Table
------------------

Rather than summing thousands of cosines per sample, we render ONE cycle
into a table with an inverse FFT and read it back with a phase accumulator:

  bin k     = (real[k] - i·imag[k]) / 2
  bin N - k = conjugate of bin k

The inverse FFT of that Hermitian spectrum is a real signal whose cycle is
exactly x(φ) sampled at N points.

Band Limiting
-------------

A harmonic above Nyquist folds back as an alias. The table is therefore
built for a known highest playback frequency: every harmonic k with
k·f_max >= sample_rate / 2 is dropped before the FFT.

Normalisation
-------------

After the FFT the table is scaled so its largest absolute value is 1.0. A
formula's overall scale therefore does not change loudness; only the
RELATIVE harmonic strengths shape the timbre.
*/

/// Points in one wavetable cycle.
pub const TABLE_SIZE: usize = 4096;

pub struct PeriodicWave {
    /// One cycle plus a guard point equal to the first sample.
    table: Vec<f32>,
    harmonics: usize,
}

impl PeriodicWave {
    /// Build a single-cycle table from harmonic coefficients, keeping
    /// harmonics `1..=max_harmonic`.
    pub fn from_coefficients(real: &[f32], imag: &[f32], max_harmonic: usize) -> Self {
        let available = real.len().max(imag.len()).saturating_sub(1);
        let harmonics = available.min(TABLE_SIZE / 2 - 1).min(max_harmonic);

        let mut spectrum = vec![Complex::new(0.0f32, 0.0); TABLE_SIZE];
        for k in 1..=harmonics {
            let re = real.get(k).copied().unwrap_or(0.0);
            let im = imag.get(k).copied().unwrap_or(0.0);
            let bin = Complex::new(re * 0.5, -im * 0.5);
            spectrum[k] = bin;
            spectrum[TABLE_SIZE - k] = bin.conj();
        }

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(TABLE_SIZE);
        ifft.process(&mut spectrum);

        let mut table: Vec<f32> = spectrum.iter().map(|c| c.re).collect();
        let peak = table.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        if peak > f32::EPSILON {
            for sample in table.iter_mut() {
                *sample /= peak;
            }
        } else {
            table.fill(0.0);
        }
        table.push(table[0]);

        Self { table, harmonics }
    }

    pub fn from_compiled(waveform: &CompiledWaveform, max_harmonic: usize) -> Self {
        Self::from_coefficients(&waveform.real, &waveform.imag, max_harmonic)
    }

    /// Highest harmonic that stays below Nyquist when the fundamental
    /// reaches `highest_frequency`. The fundamental itself is always kept;
    /// validation holds the base frequency below Nyquist.
    pub fn harmonic_limit(sample_rate: f32, highest_frequency: f32) -> usize {
        if highest_frequency <= 0.0 {
            return TABLE_SIZE / 2 - 1;
        }
        let nyquist = sample_rate * 0.5;
        let limit = (nyquist / highest_frequency).ceil() as usize;
        // Strictly below Nyquist
        limit.saturating_sub(1).max(1)
    }

    /// Number of harmonics that made it into the table.
    pub fn harmonics(&self) -> usize {
        self.harmonics
    }

    /// Read the table at `phase` (cycles, wrapped to [0, 1)) with linear
    /// interpolation.
    #[inline]
    pub fn sample(&self, phase: f64) -> f32 {
        let position = phase.rem_euclid(1.0) * TABLE_SIZE as f64;
        let index = (position as usize).min(TABLE_SIZE - 1);
        let frac = (position - index as f64) as f32;
        let a = self.table[index];
        let b = self.table[index + 1];
        a + (b - a) * frac
    }
}
