//! Real-world scenario benchmarks.
//!
//! These drive the renderer the way the audio callback does, with a voice
//! and the master bus in the loop.

mod renderer;

pub use renderer::bench_renderer;
