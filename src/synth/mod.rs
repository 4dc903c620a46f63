// Purpose: Note lifecycle, realtime rendering and the engine's public face
// This layer sits above graph nodes and owns the voice and the master bus

pub mod bus;
pub mod engine;
pub mod message;
pub mod params;
pub mod renderer;
pub mod timer;
pub mod voice;

pub use engine::{render_note, EngineState, RenderedAudio, SynthEngine};
pub use params::{EffectParams, LfoParams, OscillatorSpec, SynthParams, WaveformSource};
pub use renderer::Renderer;
