use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO is an oscillator that runs at sub-audio frequencies to modulate
parameters over time. Here it has exactly one job: vibrato. Its output is
added, in Hz, to the frequency of every oscillator in the voice.

    lfo out = sin(2π · f_lfo · t) × depth          (Hz)

    depth  2 Hz at 1 Hz rate:  220 Hz note wobbles 218 ↔ 222 Hz once a second
    depth 10 Hz at 6 Hz rate:  classic wide vibrato


One LFO, Many Notes
-------------------

The LFO is NOT part of a voice. It lives on the master bus and is started
once, the first time a note plays, and then runs forever:

    note 1      note 2           note 3
    ├───────┤   ├──────┤         ├─────┤
    ∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿∿   (LFO, free-running)

Notes only change its rate and depth. Because the phase is never reset,
each note catches the vibrato wherever it happens to be (a free-running
LFO, see `dsp/oscillator.rs` for the phase accumulator).

Before it is started the LFO renders silence and its phase does not move.
Starting it twice is a no-op; `start_count` records how often it has
actually started so callers can check it was never restarted.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32, // Fixed frequency in Hz (ignores note context)
    depth: f32,
    running: bool,
    start_count: u32,
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
            depth: 0.0,
            running: false,
            start_count: 0,
        }
    }

    /// Start the LFO. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.start_count += 1;
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_count(&self) -> u32 {
        self.start_count
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Output scale in Hz.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }

    /// Cycles elapsed in the current period, `[0, 1)`.
    pub fn phase(&self) -> f64 {
        self.osc.phase()
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.running {
            out.fill(0.0);
            return;
        }

        // The LFO's own rate, not the note frequency
        self.osc
            .render(out, f64::from(self.frequency), ctx.sample_rate);
        for sample in out.iter_mut() {
            *sample *= self.depth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0)
    }

    #[test]
    fn test_lfo_output_scaled_by_depth() {
        let mut lfo = LfoNode::sine(5.0);
        lfo.set_depth(10.0);
        lfo.start();
        let mut buffer = vec![0.0; 48_000];
        lfo.render_block(&mut buffer, &ctx());

        let peak = buffer.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak <= 10.0 + 1e-4);
        assert!(peak > 9.99, "peak {peak}");
    }

    #[test]
    fn test_lfo_silent_until_started() {
        let mut lfo = LfoNode::sine(5.0);
        lfo.set_depth(10.0);
        let mut buffer = vec![1.0; 256];
        lfo.render_block(&mut buffer, &ctx());
        assert!(buffer.iter().all(|&s| s == 0.0));
        assert_eq!(lfo.phase(), 0.0);
    }

    #[test]
    fn test_lfo_starts_once() {
        let mut lfo = LfoNode::sine(1.0);
        assert!(lfo.start());
        assert!(!lfo.start());
        assert!(lfo.is_running());
        assert_eq!(lfo.start_count(), 1);
    }

    #[test]
    fn test_lfo_phase_survives_retuning() {
        let mut lfo = LfoNode::sine(1.0);
        lfo.set_depth(1.0);
        lfo.start();
        let mut buffer = vec![0.0; 12_000];
        lfo.render_block(&mut buffer, &ctx());
        let before = lfo.phase();
        assert!((before - 0.25).abs() < 1e-9);

        lfo.set_frequency(10.0);
        lfo.set_depth(2.0);
        assert_eq!(lfo.phase(), before);
    }

    #[test]
    fn test_lfo_ignores_note_frequency() {
        let mut a = LfoNode::sine(5.0);
        let mut b = LfoNode::sine(5.0);
        for lfo in [&mut a, &mut b] {
            lfo.set_depth(1.0);
            lfo.start();
        }
        let mut buffer1 = vec![0.0; 512];
        let mut buffer2 = vec![0.0; 512];
        a.render_block(&mut buffer1, &RenderCtx::from_freq(48_000.0, 440.0));
        b.render_block(&mut buffer2, &RenderCtx::from_freq(48_000.0, 880.0));
        assert_eq!(buffer1, buffer2);
    }
}
