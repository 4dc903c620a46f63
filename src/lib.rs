pub mod config; // Engine-wide settings
pub mod dsp;
pub mod error;
pub mod formula; // User formulas → harmonic coefficients
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod synth; // Note lifecycle and rendering

pub use config::{AutoStop, EngineConfig};
pub use dsp::envelope::Adsr;
pub use error::{CompilationError, DeviceError, Result, SynthError, ValidationError};
pub use synth::{
    render_note, EffectParams, EngineState, LfoParams, OscillatorSpec, RenderedAudio, Renderer,
    SynthEngine, SynthParams, WaveformSource,
};

pub const MAX_BLOCK_SIZE: usize = 2048;
