//! Composable building blocks for constructing the voice graph.
//!
//! Graph nodes wrap the low-level DSP primitives with what a voice needs:
//! note events, note-relative time and block-based rendering.

/// Delay line followed by stereo convolution reverb.
pub mod effects;
/// Volume × automation gain stages.
pub mod gain;
/// Shared, start-once vibrato LFO.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators with per-sample frequency modulation.
pub mod oscillator;

pub use effects::EffectChain;
pub use gain::GainNode;
pub use lfo::LfoNode;
pub use node::{GraphNode, RenderCtx};
pub use oscillator::OscNode;
