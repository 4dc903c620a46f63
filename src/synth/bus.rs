use crate::{
    graph::{
        effects::EffectChain,
        lfo::LfoNode,
        node::{GraphNode, RenderCtx},
    },
    synth::{params::SynthParams, voice::VoiceGraph},
    MAX_BLOCK_SIZE,
};

/// Per-note settings for the long-lived part of the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusSettings {
    pub master_gain: f32,
    pub lfo_frequency: f32,
    pub lfo_depth: f32,
    pub delay_seconds: f32,
}

impl BusSettings {
    pub fn from_params(params: &SynthParams) -> Self {
        Self {
            // The reverb level drives the master gain ahead of the effects
            master_gain: params.effects.reverb_level,
            lfo_frequency: params.lfo.frequency_hz,
            lfo_depth: params.lfo.amplitude,
            delay_seconds: params.effects.delay_seconds,
        }
    }
}

/// Everything that outlives a note: LFO, master gain and effects.
///
/// ```text
///   LFO ──fm──▶ voice ──mix──▶ × master gain ──▶ EffectChain ──▶ L / R
/// ```
///
/// The bus renders every block whether a voice is present or not, so the
/// LFO keeps running and the reverb tail rings out between notes.
pub struct MasterBus {
    lfo: LfoNode,
    effects: EffectChain,
    master_gain: f32,
    sample_rate: f32,
    fm: Vec<f32>,
    mix: Vec<f32>,
}

impl MasterBus {
    pub fn new(effects: EffectChain, sample_rate: f32) -> Self {
        Self {
            lfo: LfoNode::sine(1.0),
            effects,
            master_gain: 1.0,
            sample_rate,
            fm: vec![0.0; MAX_BLOCK_SIZE],
            mix: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn block_size(&self) -> usize {
        self.effects.block_size()
    }

    pub fn lfo(&self) -> &LfoNode {
        &self.lfo
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn effects(&self) -> &EffectChain {
        &self.effects
    }

    /// Take on a new note's settings. The LFO is started the first time
    /// and only retuned afterwards.
    pub fn apply(&mut self, settings: &BusSettings) {
        self.lfo.start();
        self.lfo.set_frequency(settings.lfo_frequency);
        self.lfo.set_depth(settings.lfo_depth);
        self.master_gain = settings.master_gain;
        self.effects.set_delay_seconds(settings.delay_seconds);
    }

    /// Render one block of `block_size()` frames.
    pub fn render_block(
        &mut self,
        voice: Option<&mut VoiceGraph>,
        left: &mut [f32],
        right: &mut [f32],
    ) {
        let n = left.len();
        debug_assert_eq!(n, self.block_size());

        let ctx = RenderCtx::from_freq(self.sample_rate, 0.0);
        let fm = &mut self.fm[..n];
        self.lfo.render_block(fm, &ctx);

        let mix = &mut self.mix[..n];
        mix.fill(0.0);
        if let Some(voice) = voice {
            voice.render_block(mix, fm);
        }
        for sample in mix.iter_mut() {
            *sample *= self.master_gain;
        }

        self.effects.process_block(mix, left, right);
    }
}
