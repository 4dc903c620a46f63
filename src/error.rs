//! Error types for every boundary of the synthesizer.
//!
//! Formula problems are recoverable (the oscillator falls back to a sine),
//! parameter problems are rejected before any graph is built, and device
//! problems end the session.

use thiserror::Error;

/// Why a user formula could not be turned into harmonic coefficients.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("expected {expected}, found {found} at position {pos}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        pos: usize,
    },

    #[error("unexpected end of formula, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unknown name '{name}' at position {pos}")]
    UnknownName { name: String, pos: usize },

    #[error("function '{name}' takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("formula nests deeper than {max} levels at position {pos}")]
    TooDeep { max: usize, pos: usize },

    #[error("formula is not finite at sample {index} (t = {t})")]
    NonFinite { index: usize, t: f64 },
}

/// A parameter outside its documented range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: String, value: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be greater than {min}, got {value}")]
    NotPositive { field: String, value: f64, min: f64 },

    #[error("engine config: {0}")]
    Config(String),
}

/// The platform audio output could not be opened or started.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device available")]
    NoOutputDevice,

    #[error("failed to fetch default output config")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported output sample format {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The renderer has not drained earlier commands yet.
    #[error("render command queue is full")]
    QueueFull,

    #[error("failed to spawn note timer")]
    Timer(#[source] std::io::Error),

    #[error("failed to write audio file")]
    Wav(#[from] hound::Error),
}

pub type Result<T, E = SynthError> = std::result::Result<T, E>;
