//! Synthetic room impulse responses.
//!
//! A real room answers a click with a burst of reflections that thins out
//! over time. White noise under a decaying envelope is a cheap stand-in:
//!
//! ```text
//! sample[i] = uniform(-1, 1) × (1 - i / len)²
//! ```
//!
//! Each channel draws its own noise so the left and right tails are
//! decorrelated, which is what makes the reverb sound wide.

use rand::Rng;

/// Power normalisation constant used by Web Audio's ConvolverNode.
const GAIN_CALIBRATION: f32 = 0.00125;
/// Sample rate the calibration constant was tuned at.
const GAIN_CALIBRATION_SAMPLE_RATE: f32 = 44_100.0;
/// Floor for the measured power so near-silent kernels don't explode.
const MIN_POWER: f32 = 0.000125;

pub struct ImpulseResponse {
    sample_rate: u32,
    channels: [Vec<f32>; 2],
}

impl ImpulseResponse {
    /// Generate a stereo decaying-noise response `duration_seconds` long.
    pub fn synthesize<R: Rng + ?Sized>(
        duration_seconds: f32,
        sample_rate: u32,
        rng: &mut R,
    ) -> Self {
        let len = (duration_seconds.max(0.0) * sample_rate as f32).round() as usize;
        let channels = [decaying_noise(len, rng), decaying_noise(len, rng)];
        Self {
            sample_rate,
            channels,
        }
    }

    /// Wrap existing kernels. Both channels must have the same length.
    pub fn from_channels(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert_eq!(left.len(), right.len());
        Self {
            sample_rate,
            channels: [left, right],
        }
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>; 2] {
        &self.channels
    }

    /// Scale applied to the kernel so loudness doesn't depend on the random
    /// draw: `GAIN_CALIBRATION / rms` over both channels, adjusted for the
    /// sample rate the way Web Audio's ConvolverNode does.
    pub fn normalization_gain(&self) -> f32 {
        let total = (self.len() * self.channels.len()) as f32;
        if total == 0.0 {
            return 1.0;
        }
        let energy: f32 = self
            .channels
            .iter()
            .flat_map(|c| c.iter())
            .map(|s| s * s)
            .sum();
        let power = (energy / total).sqrt();
        let power = if power.is_finite() {
            power.max(MIN_POWER)
        } else {
            MIN_POWER
        };
        let mut gain = GAIN_CALIBRATION / power;
        if self.sample_rate > 0 {
            gain *= GAIN_CALIBRATION_SAMPLE_RATE / self.sample_rate as f32;
        }
        gain
    }
}

fn decaying_noise<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let decay = 1.0 - i as f32 / len as f32;
            rng.gen_range(-1.0f32..1.0) * decay * decay
        })
        .collect()
}
