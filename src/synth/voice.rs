use crate::{
    graph::{
        gain::GainNode,
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
    },
    MAX_BLOCK_SIZE,
};

/// One note: oscillators, each feeding its own gain stage, summed.
///
/// ```text
///   fm ──┬──▶ osc 0 ──▶ gain 0 ──┐
///        ├──▶ osc 1 ──▶ gain 1 ──┼──▶ mix
///        └──▶ osc n ──▶ gain n ──┘
/// ```
///
/// A voice is built on the control thread, rendered on the audio thread and
/// sent back to the control thread to be dropped. It never touches the LFO
/// or the effects; those belong to the `MasterBus`.
pub struct VoiceGraph {
    id: u64,
    frequency: f32,
    sample_rate: f32,
    stages: Vec<(OscNode, GainNode)>,
    elapsed_frames: u64,
    length_frames: u64,
    scratch: Vec<f32>,
}

impl VoiceGraph {
    pub fn new(
        id: u64,
        frequency: f32,
        duration_seconds: f32,
        sample_rate: f32,
        stages: Vec<(OscNode, GainNode)>,
    ) -> Self {
        let mut voice = Self {
            id,
            frequency,
            sample_rate,
            stages,
            elapsed_frames: 0,
            length_frames: (duration_seconds * sample_rate).round() as u64,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        };

        let ctx = voice.ctx();
        for (osc, gain) in &mut voice.stages {
            osc.note_on(&ctx);
            gain.note_on(&ctx);
        }
        voice
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn stages(&self) -> &[(OscNode, GainNode)] {
        &self.stages
    }

    /// Oscillator and gain nodes owned by this voice.
    pub fn node_count(&self) -> usize {
        self.stages.len() * 2
    }

    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    pub fn length_frames(&self) -> u64 {
        self.length_frames
    }

    /// The note has rendered its full duration.
    pub fn is_finished(&self) -> bool {
        self.elapsed_frames >= self.length_frames
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::from_freq(self.sample_rate, self.frequency)
            .at(self.elapsed_frames as f64 / f64::from(self.sample_rate))
    }

    /// Add this block of the note into `mix`, with `fm` as the per-sample
    /// frequency offset for every oscillator.
    pub fn render_block(&mut self, mix: &mut [f32], fm: &[f32]) {
        debug_assert!(mix.len() <= MAX_BLOCK_SIZE);
        let ctx = self.ctx();
        let buffer = &mut self.scratch[..mix.len()];

        for (osc, gain) in &mut self.stages {
            osc.render_modulated(buffer, fm, &ctx);
            gain.render_block(buffer, &ctx);
            for (out, sample) in mix.iter_mut().zip(buffer.iter()) {
                *out += sample;
            }
        }

        self.elapsed_frames += mix.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{envelope::Adsr, oscillator::Waveform};

    fn voice(stages: usize, duration: f32) -> VoiceGraph {
        let stages = (0..stages)
            .map(|_| {
                (
                    OscNode::new(Waveform::Sine, 0.0),
                    GainNode::with_envelope(0.5, &Adsr::default(), duration),
                )
            })
            .collect();
        VoiceGraph::new(7, 220.0, duration, 8_000.0, stages)
    }

    #[test]
    fn finishes_after_note_length() {
        let mut voice = voice(1, 0.1);
        assert_eq!(voice.length_frames(), 800);
        let mut mix = vec![0.0; 256];
        let fm = vec![0.0; 256];
        for _ in 0..3 {
            voice.render_block(&mut mix, &fm);
            assert!(!voice.is_finished());
        }
        voice.render_block(&mut mix, &fm);
        assert!(voice.is_finished());
    }

    #[test]
    fn stages_sum_into_mix() {
        let mut one = voice(1, 1.0);
        let mut two = voice(2, 1.0);
        let fm = vec![0.0; 512];
        let mut a = vec![0.0; 512];
        let mut b = vec![0.0; 512];
        one.render_block(&mut a, &fm);
        two.render_block(&mut b, &fm);
        for (x, y) in a.iter().zip(&b) {
            assert!((2.0 * x - y).abs() < 1e-6);
        }
        assert_eq!(two.node_count(), 4);
    }

    #[test]
    fn silent_at_note_start() {
        let mut voice = voice(1, 1.0);
        let mut mix = vec![0.0; 16];
        voice.render_block(&mut mix, &[0.0; 16]);
        assert_eq!(mix[0], 0.0);
    }
}
