use crate::dsp::oscillator::{cents_to_ratio, OscillatorBlock, Waveform};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

An oscillator is the sound source of a voice. It repeats one cycle of a
waveform at the note's pitch.

Waveforms
---------

Sine: a single frequency, no harmonics. Also the fallback whenever a
  user formula fails to compile.

Periodic: a custom cycle built from a harmonic series (see
  `dsp/wavetable.rs`). The formula decides how loud each harmonic is:

    harmonic 1:  220 Hz   (the pitch you hear)
    harmonic 2:  440 Hz
    harmonic 3:  660 Hz
    ...

Pitch
-----

The instantaneous frequency combines three inputs:

    f(t) = (note frequency + fm(t)) × 2^(detune / 1200)

  note frequency   From the render context (the voice's base frequency)
  fm(t)            Offset in Hz from the shared LFO, one value per sample
  detune           Fixed per oscillator, in cents (100 cents = 1 semitone)

Because the LFO offset is added BEFORE the detune ratio, a detuned
oscillator sees a proportionally scaled vibrato, the same way an
AudioParam offset feeds a detuned Web Audio oscillator.

Example usage:
  let osc = OscNode::sine();
  let osc = OscNode::new(Waveform::Periodic(wave), -7.0);
*/

pub struct OscNode {
    osc: OscillatorBlock,
    detune_cents: f32,
    ratio: f64,
}

impl OscNode {
    pub fn new(waveform: Waveform, detune_cents: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            detune_cents,
            ratio: cents_to_ratio(detune_cents),
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine, 0.0)
    }

    pub fn waveform(&self) -> &Waveform {
        self.osc.waveform()
    }

    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    /// Render with a per-sample frequency offset in Hz.
    pub fn render_modulated(&mut self, out: &mut [f32], fm: &[f32], ctx: &RenderCtx) {
        self.osc
            .render_modulated(out, ctx.frequency, fm, self.ratio, ctx.sample_rate);
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc
            .render(out, f64::from(ctx.frequency) * self.ratio, ctx.sample_rate);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}
