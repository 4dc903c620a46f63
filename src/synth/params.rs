//! The parameter snapshot a note is built from.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{config::EngineConfig, dsp::envelope::Adsr, error::ValidationError};

/// Where an oscillator's cycle comes from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformSource {
    /// A user formula of `t`, compiled to harmonic coefficients.
    Formula(String),
    /// A plain sine, no compilation.
    Sine,
}

impl From<&str> for WaveformSource {
    fn from(formula: &str) -> Self {
        WaveformSource::Formula(formula.to_string())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorSpec {
    pub waveform: WaveformSource,
    /// 0.0 - 1.0
    pub volume: f32,
    pub detune_cents: f32,
}

impl OscillatorSpec {
    pub fn formula(formula: impl Into<String>, volume: f32) -> Self {
        Self {
            waveform: WaveformSource::Formula(formula.into()),
            volume,
            detune_cents: 0.0,
        }
    }

    pub fn sine(volume: f32) -> Self {
        Self {
            waveform: WaveformSource::Sine,
            volume,
            detune_cents: 0.0,
        }
    }

    pub fn detuned(mut self, cents: f32) -> Self {
        self.detune_cents = cents;
        self
    }
}

impl Default for OscillatorSpec {
    fn default() -> Self {
        Self::formula(DEFAULT_FORMULA, 0.5)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    /// 0.0 - 1.0, drives the master gain ahead of the effects
    pub reverb_level: f32,
    /// 0.0 - max delay (5 s by default)
    pub delay_seconds: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            reverb_level: 0.5,
            delay_seconds: 0.3,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    pub frequency_hz: f32,
    /// Vibrato depth in Hz
    pub amplitude: f32,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            frequency_hz: 1.0,
            amplitude: 0.0,
        }
    }
}

pub const DEFAULT_FORMULA: &str = "sin(2 * pi * t)";
pub const DEFAULT_BASE_FREQUENCY: f32 = 220.0;
pub const DEFAULT_DURATION: f32 = 2.0;
/// Detune is limited to four octaves either way.
pub const MAX_DETUNE_CENTS: f32 = 4_800.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthParams {
    pub oscillators: Vec<OscillatorSpec>,
    pub envelope: Adsr,
    pub effects: EffectParams,
    pub lfo: LfoParams,
    pub duration_seconds: f32,
    pub base_frequency: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            oscillators: vec![OscillatorSpec::default()],
            envelope: Adsr::default(),
            effects: EffectParams::default(),
            lfo: LfoParams::default(),
            duration_seconds: DEFAULT_DURATION,
            base_frequency: DEFAULT_BASE_FREQUENCY,
        }
    }
}

impl SynthParams {
    /// Two stacked partials with a 1 Hz, 10 Hz deep vibrato.
    pub fn two_oscillator_preset() -> Self {
        Self {
            oscillators: vec![
                OscillatorSpec::formula("Math.sin(2 * Math.PI * t)", 0.5),
                OscillatorSpec::formula("Math.sin(4 * Math.PI * t)", 0.3),
            ],
            lfo: LfoParams {
                frequency_hz: 1.0,
                amplitude: 10.0,
            },
            ..Self::default()
        }
    }

    /// Highest frequency any oscillator can reach, including vibrato and
    /// detune. Used to band-limit wavetables.
    pub fn peak_frequency(&self, detune_cents: f32) -> f32 {
        let ratio = 2f32.powf(detune_cents / 1200.0);
        (self.base_frequency + self.lfo.amplitude.abs()) * ratio
    }

    /// Reject anything outside its documented range. Nothing is clamped.
    pub fn validate(&self, config: &EngineConfig) -> Result<(), ValidationError> {
        for (i, osc) in self.oscillators.iter().enumerate() {
            in_range(&format!("oscillators[{i}].volume"), osc.volume, 0.0, 1.0)?;
            in_range(
                &format!("oscillators[{i}].detune_cents"),
                osc.detune_cents,
                -MAX_DETUNE_CENTS,
                MAX_DETUNE_CENTS,
            )?;
        }

        non_negative("envelope.attack", self.envelope.attack)?;
        non_negative("envelope.decay", self.envelope.decay)?;
        in_range("envelope.sustain", self.envelope.sustain, 0.0, 1.0)?;
        non_negative("envelope.release", self.envelope.release)?;

        in_range("effects.reverb_level", self.effects.reverb_level, 0.0, 1.0)?;
        in_range(
            "effects.delay_seconds",
            self.effects.delay_seconds,
            0.0,
            config.max_delay_seconds,
        )?;

        non_negative("lfo.frequency_hz", self.lfo.frequency_hz)?;
        non_negative("lfo.amplitude", self.lfo.amplitude)?;

        positive("duration_seconds", self.duration_seconds)?;
        positive("base_frequency", self.base_frequency)?;
        let nyquist = config.sample_rate as f32 * 0.5;
        if self.base_frequency >= nyquist {
            return Err(ValidationError::OutOfRange {
                field: "base_frequency".to_string(),
                value: f64::from(self.base_frequency),
                min: 0.0,
                max: f64::from(nyquist),
            });
        }

        for (i, osc) in self.oscillators.iter().enumerate() {
            finite(
                &format!("oscillators[{i}] peak frequency"),
                self.peak_frequency(osc.detune_cents),
            )?;
        }
        Ok(())
    }
}

fn finite(field: &str, value: f32) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            field: field.to_string(),
            value: f64::from(value),
        })
    }
}

fn in_range(field: &str, value: f32, min: f32, max: f32) -> Result<(), ValidationError> {
    finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: f64::from(value),
            min: f64::from(min),
            max: f64::from(max),
        })
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ValidationError> {
    in_range(field, value, 0.0, f32::MAX)
}

fn positive(field: &str, value: f32) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive {
            field: field.to_string(),
            value: f64::from(value),
            min: 0.0,
        })
    }
}
