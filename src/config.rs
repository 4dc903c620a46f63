//! Engine-wide settings fixed at construction time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, MAX_BLOCK_SIZE};

/// How a playing note is brought to its end.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoStop {
    /// A timer thread stops the note after its duration has elapsed on the
    /// wall clock, like a UI would. Used for live device output.
    #[default]
    WallClock,
    /// The renderer retires the note once it has rendered the note's
    /// length in samples. Used for offline rendering and tests, where the
    /// render may run faster or slower than real time.
    SampleClock,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: u32,
    /// Frames per internal render block; also the convolution partition.
    pub block_size: usize,
    /// Length of the synthesized reverb impulse response.
    pub impulse_seconds: f32,
    /// Capacity of the delay line.
    pub max_delay_seconds: f32,
    /// Seed for the impulse response noise. `None` draws from entropy.
    pub seed: Option<u64>,
    pub auto_stop: AutoStop,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 256,
            impulse_seconds: 2.0,
            max_delay_seconds: 5.0,
            seed: None,
            auto_stop: AutoStop::WallClock,
        }
    }
}

impl EngineConfig {
    /// Defaults for headless rendering at `sample_rate`.
    pub fn offline(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            auto_stop: AutoStop::SampleClock,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sample_rate == 0 {
            return Err(ValidationError::Config("sample_rate must be non-zero".into()));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ValidationError::Config(format!(
                "block_size must be within 1..={MAX_BLOCK_SIZE}, got {}",
                self.block_size
            )));
        }
        if !self.impulse_seconds.is_finite() || self.impulse_seconds < 0.0 {
            return Err(ValidationError::Config(format!(
                "impulse_seconds must be a non-negative number, got {}",
                self.impulse_seconds
            )));
        }
        if !self.max_delay_seconds.is_finite() || self.max_delay_seconds < 0.0 {
            return Err(ValidationError::Config(format!(
                "max_delay_seconds must be a non-negative number, got {}",
                self.max_delay_seconds
            )));
        }
        Ok(())
    }
}
