use crate::dsp::{automation::ParamTimeline, envelope::Adsr};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/// Gain stage: `out[i] *= volume × timeline(t)`.
///
/// The timeline is evaluated at note time (`ctx.time` plus the sample
/// offset), so a gain stage can be rendered in blocks of any size up to
/// `MAX_BLOCK_SIZE`.
pub struct GainNode {
    volume: f32,
    timeline: ParamTimeline,
    curve: Vec<f32>,
}

impl GainNode {
    /// Fixed gain with no automation.
    pub fn constant(volume: f32) -> Self {
        Self::with_timeline(volume, ParamTimeline::new(1.0))
    }

    pub fn with_timeline(volume: f32, timeline: ParamTimeline) -> Self {
        Self {
            volume,
            timeline,
            curve: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// `volume` shaped by `envelope` over a note of `note_duration` seconds.
    pub fn with_envelope(volume: f32, envelope: &Adsr, note_duration: f32) -> Self {
        Self::with_timeline(volume, envelope.timeline(note_duration))
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn timeline(&self) -> &ParamTimeline {
        &self.timeline
    }

    /// Effective gain at `time` seconds into the note.
    pub fn gain_at(&self, time: f64) -> f32 {
        self.volume * self.timeline.value_at(time)
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (out_chunk, start) in out
            .chunks_mut(MAX_BLOCK_SIZE)
            .zip((0..).step_by(MAX_BLOCK_SIZE))
        {
            let curve = &mut self.curve[..out_chunk.len()];
            let offset = start as f64 / f64::from(ctx.sample_rate);
            self.timeline
                .render(curve, ctx.time + offset, ctx.sample_rate);
            for (sample, gain) in out_chunk.iter_mut().zip(curve.iter()) {
                *sample *= self.volume * gain;
            }
        }
    }
}
