use std::path::PathBuf;

use alien_synth::{Adsr, EffectParams, LfoParams, OscillatorSpec, SynthParams};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "alien")]
#[command(version, about = "Alien sound generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a sound from a waveform formula
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Waveform formula of t (harmonic amplitudes)
    #[arg(short, long, default_value = "sin(2*pi*t)")]
    pub formula: String,

    /// Volume (0-1)
    #[arg(short, long, default_value_t = 0.5)]
    pub volume: f32,

    /// Frequency in Hz
    #[arg(short = 'q', long, default_value_t = 220.0)]
    pub frequency: f32,

    /// Detune in cents
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub detune: f32,

    /// Duration in seconds
    #[arg(short = 't', long, default_value_t = 2.0)]
    pub duration: f32,

    /// Envelope attack time
    #[arg(short, long, default_value_t = 0.1)]
    pub attack: f32,

    /// Envelope decay time
    #[arg(short = 'c', long, default_value_t = 0.2)]
    pub decay: f32,

    /// Envelope sustain level
    #[arg(short, long, default_value_t = 0.7)]
    pub sustain: f32,

    /// Envelope release time
    #[arg(short, long, default_value_t = 0.5)]
    pub release: f32,

    /// Reverb level (0-1)
    #[arg(long, default_value_t = 0.5)]
    pub reverb: f32,

    /// Delay time in seconds
    #[arg(long, default_value_t = 0.3)]
    pub delay: f32,

    /// LFO rate in Hz
    #[arg(long, default_value_t = 1.0)]
    pub lfo_frequency: f32,

    /// LFO depth in Hz (0 disables vibrato)
    #[arg(long, default_value_t = 0.0)]
    pub lfo_amplitude: f32,

    /// Extra oscillator as FORMULA[:VOLUME[:DETUNE]] (repeatable)
    #[arg(long = "osc", value_name = "SPEC", value_parser = parse_oscillator)]
    pub extra_oscillators: Vec<OscillatorSpec>,

    /// Sample rate for offline rendering (device rate is used otherwise)
    #[arg(long, default_value_t = 48_000)]
    pub sample_rate: u32,

    /// Seed for the reverb impulse response
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render to this WAV file instead of playing
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn to_params(&self) -> SynthParams {
        let mut oscillators = vec![OscillatorSpec::formula(&self.formula, self.volume)
            .detuned(self.detune)];
        oscillators.extend(self.extra_oscillators.iter().cloned());

        SynthParams {
            oscillators,
            envelope: Adsr::new(self.attack, self.decay, self.sustain, self.release),
            effects: EffectParams {
                reverb_level: self.reverb,
                delay_seconds: self.delay,
            },
            lfo: LfoParams {
                frequency_hz: self.lfo_frequency,
                amplitude: self.lfo_amplitude,
            },
            duration_seconds: self.duration,
            base_frequency: self.frequency,
        }
    }
}

/// `FORMULA[:VOLUME[:DETUNE]]`. Formulas never contain ':'.
fn parse_oscillator(raw: &str) -> Result<OscillatorSpec, String> {
    let mut parts = raw.split(':');
    let formula = parts
        .next()
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| "missing formula".to_string())?;

    let volume = match parts.next() {
        Some(v) => v
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid volume '{v}': {e}"))?,
        None => 0.5,
    };
    let detune = match parts.next() {
        Some(d) => d
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid detune '{d}': {e}"))?,
        None => 0.0,
    };
    if parts.next().is_some() {
        return Err(format!("too many ':' fields in '{raw}'"));
    }

    Ok(OscillatorSpec::formula(formula.trim(), volume).detuned(detune))
}
