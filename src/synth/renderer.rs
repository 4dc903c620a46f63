use std::sync::Arc;

use rtrb::{Consumer, Producer, PushError};

use crate::synth::{
    bus::MasterBus,
    message::{MessageReceiver, NoteFlags, RenderCommand},
    voice::VoiceGraph,
};

/*
Renderer
========

The render side of the engine. It is moved into the audio callback (or
driven directly for offline rendering) and owns everything that makes
sound: the master bus and the current voice.

    control thread                         render side
    ──────────────                         ───────────
    SynthEngine ── Play(voice) ──▶ ring ──▶ Renderer
         ▲                                    │
         └──────── retired voices ◀── ring ◀──┘

         stop request / finished note: two AtomicU64 note ids

Nothing here allocates, locks or blocks. A retired voice is pushed back
to the control thread so its buffers are freed there, not in the audio
callback. While that ring is full the voice stays here: a stopped voice
is held silent, and new Play commands wait in their queue.

Blocks and Frames
-----------------

The bus (and its convolver) works on fixed blocks of `block_size` frames.
Audio callbacks ask for whatever length the device likes, so the
renderer keeps the last rendered block and hands it out frame by frame:

    device asks for 300 frames, block_size = 256

    block 1: [████████████████]           256 frames served
    block 2: [███░░░░░░░░░░░░░]            44 frames served, 212 kept
*/

pub struct Renderer {
    bus: MasterBus,
    voice: Option<Box<VoiceGraph>>,
    commands: Consumer<RenderCommand>,
    retired: Producer<Box<VoiceGraph>>,
    flags: Arc<NoteFlags>,
    /// Retire voices when they reach their length.
    retire_finished: bool,
    left: Vec<f32>,
    right: Vec<f32>,
    cursor: usize,
    frames_rendered: u64,
}

impl Renderer {
    pub(crate) fn new(
        bus: MasterBus,
        commands: Consumer<RenderCommand>,
        retired: Producer<Box<VoiceGraph>>,
        flags: Arc<NoteFlags>,
        retire_finished: bool,
    ) -> Self {
        let block_size = bus.block_size();
        Self {
            bus,
            voice: None,
            commands,
            retired,
            flags,
            retire_finished,
            left: vec![0.0; block_size],
            right: vec![0.0; block_size],
            // Force a render on the first frame
            cursor: block_size,
            frames_rendered: 0,
        }
    }

    pub fn bus(&self) -> &MasterBus {
        &self.bus
    }

    pub fn has_voice(&self) -> bool {
        self.voice.is_some()
    }

    /// Id of the voice currently sounding.
    pub fn voice_id(&self) -> Option<u64> {
        self.voice.as_ref().map(|voice| voice.id())
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Next stereo frame.
    #[inline]
    pub fn next_frame(&mut self) -> (f32, f32) {
        if self.cursor >= self.left.len() {
            self.render_block();
            self.cursor = 0;
        }
        let frame = (self.left[self.cursor], self.right[self.cursor]);
        self.cursor += 1;
        frame
    }

    /// Fill separate left and right buffers of equal length.
    pub fn fill(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.next_frame();
        }
    }

    /// Fill an interleaved device buffer with `channels` channels.
    ///
    /// Mono devices get the average of left and right; channels beyond
    /// the first two are left silent.
    pub fn fill_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in data.chunks_mut(channels) {
            let (left, right) = self.next_frame();
            match frame {
                [mono] => *mono = 0.5 * (left + right),
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    fn render_block(&mut self) {
        // A new voice needs a free slot for the one it replaces
        while self.voice.is_none() || !self.retired.is_full() {
            let Some(command) = MessageReceiver::pop(&mut self.commands) else {
                break;
            };
            match command {
                RenderCommand::Play { voice, settings } => {
                    self.retire();
                    self.bus.apply(&settings);
                    self.voice = Some(voice);
                }
            }
        }

        let stopping = self
            .voice_id()
            .is_some_and(|id| self.flags.should_stop(id));
        if stopping {
            self.retire();
        }

        let voice = if stopping {
            None
        } else {
            self.voice.as_deref_mut()
        };
        self.bus.render_block(voice, &mut self.left, &mut self.right);
        self.frames_rendered += self.left.len() as u64;

        if self.retire_finished && self.voice.as_ref().is_some_and(|v| v.is_finished()) {
            self.retire();
        }
    }

    /// Hand the current voice back to the control thread. Keeps it if the
    /// return ring is full.
    fn retire(&mut self) {
        let Some(voice) = self.voice.take() else {
            return;
        };
        let id = voice.id();
        match self.retired.push(voice) {
            Ok(()) => self.flags.mark_finished(id),
            Err(PushError::Full(voice)) => self.voice = Some(voice),
        }
    }
}

#[cfg(test)]
mod tests {
    use rtrb::RingBuffer;

    use super::*;
    use crate::{
        dsp::{envelope::Adsr, impulse::ImpulseResponse, oscillator::Waveform},
        graph::{effects::EffectChain, gain::GainNode, oscillator::OscNode},
        synth::{bus::BusSettings, params::SynthParams},
    };

    const SAMPLE_RATE: f32 = 8_000.0;

    struct Harness {
        renderer: Renderer,
        commands: Producer<RenderCommand>,
        retired: Consumer<Box<VoiceGraph>>,
        flags: Arc<NoteFlags>,
    }

    /// A renderer whose return ring holds a single voice.
    fn harness() -> Harness {
        let ir = ImpulseResponse::from_channels(vec![1.0], vec![1.0], SAMPLE_RATE as u32);
        let bus = MasterBus::new(EffectChain::new(&ir, 64, 1.0, SAMPLE_RATE), SAMPLE_RATE);
        let (commands, command_rx) = RingBuffer::new(4);
        let (retired_tx, retired) = RingBuffer::new(1);
        let flags = Arc::new(NoteFlags::default());
        let renderer = Renderer::new(bus, command_rx, retired_tx, Arc::clone(&flags), true);
        Harness {
            renderer,
            commands,
            retired,
            flags,
        }
    }

    fn play(h: &mut Harness, id: u64) {
        let stages = vec![(
            OscNode::new(Waveform::Sine, 0.0),
            GainNode::with_envelope(0.5, &Adsr::default(), 2.0),
        )];
        let mut params = SynthParams::default();
        params.effects.delay_seconds = 0.0;
        let command = RenderCommand::Play {
            voice: Box::new(VoiceGraph::new(id, 220.0, 2.0, SAMPLE_RATE, stages)),
            settings: BusSettings::from_params(&params),
        };
        assert!(h.commands.push(command).is_ok());
    }

    fn block(h: &mut Harness) -> Vec<f32> {
        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        h.renderer.fill(&mut left, &mut right);
        left
    }

    #[test]
    fn new_voice_waits_for_room_in_return_ring() {
        let mut h = harness();
        play(&mut h, 1);
        block(&mut h);
        play(&mut h, 2);
        block(&mut h);
        assert_eq!(h.renderer.voice_id(), Some(2));
        assert!(h.flags.has_finished(1));

        // Ring now holds voice 1; voice 3 stays queued behind it
        play(&mut h, 3);
        block(&mut h);
        assert_eq!(h.renderer.voice_id(), Some(2));
        assert!(!h.flags.has_finished(2));

        assert_eq!(h.retired.pop().map(|v| v.id()).ok(), Some(1));
        block(&mut h);
        assert_eq!(h.renderer.voice_id(), Some(3));
        assert!(h.flags.has_finished(2));
    }

    #[test]
    fn stopped_voice_is_held_silent_until_reclaimed() {
        let mut h = harness();
        play(&mut h, 1);
        block(&mut h);
        play(&mut h, 2);
        block(&mut h);

        h.flags.request_stop(2);
        let out = block(&mut h);
        assert!(out.iter().all(|s| s.abs() < 1e-6));
        assert_eq!(h.renderer.voice_id(), Some(2));
        assert!(!h.flags.has_finished(2));

        assert!(h.retired.pop().is_ok());
        block(&mut h);
        assert!(!h.renderer.has_voice());
        assert!(h.flags.has_finished(2));
    }
}
