use std::{collections::HashMap, sync::Arc, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use rtrb::{Consumer, Producer, PushError, RingBuffer};
use tracing::{debug, warn};

use crate::{
    config::{AutoStop, EngineConfig},
    dsp::{impulse::ImpulseResponse, oscillator::Waveform, wavetable::PeriodicWave},
    error::{CompilationError, Result, SynthError},
    formula::{compile, CompiledWaveform},
    graph::{effects::EffectChain, gain::GainNode, oscillator::OscNode},
    synth::{
        bus::{BusSettings, MasterBus},
        message::{NoteFlags, RenderCommand},
        params::{OscillatorSpec, SynthParams, WaveformSource},
        renderer::Renderer,
        timer::NoteTimer,
        voice::VoiceGraph,
    },
};

const COMMAND_QUEUE_SIZE: usize = 16;
const RETIRED_QUEUE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Playing,
}

/// Control side of the synthesizer.
///
/// Owns the formula cache and the impulse response, builds a `VoiceGraph`
/// per note and hands it to the paired `Renderer`. One note at a time:
/// starting while a note is playing stops it first.
pub struct SynthEngine {
    config: EngineConfig,
    commands: Producer<RenderCommand>,
    retired: Consumer<Box<VoiceGraph>>,
    flags: Arc<NoteFlags>,
    impulse: Arc<ImpulseResponse>,
    waveforms: HashMap<String, std::result::Result<Arc<CompiledWaveform>, CompilationError>>,
    state: EngineState,
    current_note: u64,
    timer: Option<NoteTimer>,
    reclaimed: usize,
}

impl SynthEngine {
    /// Create an engine and the renderer it drives.
    ///
    /// The impulse response is synthesized here, once.
    pub fn new(config: EngineConfig) -> Result<(Self, Renderer)> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let impulse = Arc::new(ImpulseResponse::synthesize(
            config.impulse_seconds,
            config.sample_rate,
            &mut rng,
        ));

        let sample_rate = config.sample_rate as f32;
        let effects = EffectChain::new(
            &impulse,
            config.block_size,
            config.max_delay_seconds,
            sample_rate,
        );
        let bus = MasterBus::new(effects, sample_rate);

        let (commands, command_rx) = RingBuffer::<RenderCommand>::new(COMMAND_QUEUE_SIZE);
        let (retired_tx, retired) = RingBuffer::<Box<VoiceGraph>>::new(RETIRED_QUEUE_SIZE);
        let flags = Arc::new(NoteFlags::default());

        let renderer = Renderer::new(
            bus,
            command_rx,
            retired_tx,
            Arc::clone(&flags),
            config.auto_stop == AutoStop::SampleClock,
        );

        debug!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            impulse_len = impulse.len(),
            "synth engine created"
        );

        let engine = Self {
            config,
            commands,
            retired,
            flags,
            impulse,
            waveforms: HashMap::new(),
            state: EngineState::Idle,
            current_note: 0,
            timer: None,
            reclaimed: 0,
        };
        Ok((engine, renderer))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn impulse_response(&self) -> &Arc<ImpulseResponse> {
        &self.impulse
    }

    /// Current state without reconciling with the renderer; see `poll`.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Id of the most recently started note (0 before the first).
    pub fn current_note(&self) -> u64 {
        self.current_note
    }

    /// Voices handed back by the renderer and dropped so far.
    pub fn reclaimed_voices(&self) -> usize {
        self.reclaimed
    }

    /// Distinct formulas compiled so far (successfully or not).
    pub fn cached_formulas(&self) -> usize {
        self.waveforms.len()
    }

    /// Start a note. Returns its id.
    pub fn start(&mut self, params: &SynthParams) -> Result<u64> {
        params.validate(&self.config)?;
        self.stop();

        let note_id = self.current_note + 1;
        let voice = self.build_voice(note_id, params);
        let settings = BusSettings::from_params(params);
        let nodes = voice.node_count();

        if let Err(PushError::Full(_)) = self.commands.push(RenderCommand::Play {
            voice: Box::new(voice),
            settings,
        }) {
            return Err(SynthError::QueueFull);
        }

        self.current_note = note_id;
        self.state = EngineState::Playing;

        if self.config.auto_stop == AutoStop::WallClock {
            let after =
                Duration::try_from_secs_f32(params.duration_seconds).unwrap_or(Duration::MAX);
            let timer = NoteTimer::schedule(note_id, after, Arc::clone(&self.flags))
                .map_err(SynthError::Timer)?;
            self.timer = Some(timer);
        }

        debug!(
            note_id,
            nodes,
            duration = params.duration_seconds,
            "note started"
        );
        Ok(note_id)
    }

    /// Stop the current note. A no-op while idle.
    ///
    /// Only the voice is retired; the LFO and the effects keep running.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.reclaim();

        if self.state == EngineState::Idle {
            return;
        }
        self.flags.request_stop(self.current_note);
        self.state = EngineState::Idle;
        debug!(note_id = self.current_note, "note stopped");
    }

    /// Reclaim retired voices and notice notes that ended on their own.
    pub fn poll(&mut self) -> EngineState {
        self.reclaim();

        if self.state == EngineState::Playing {
            let timer_fired = self.timer.as_ref().is_some_and(NoteTimer::has_fired);
            if timer_fired || self.flags.has_finished(self.current_note) {
                if let Some(timer) = self.timer.take() {
                    timer.cancel();
                }
                self.state = EngineState::Idle;
                debug!(note_id = self.current_note, "note ended");
            }
        }
        self.state
    }

    fn reclaim(&mut self) {
        while let Ok(voice) = self.retired.pop() {
            debug!(
                note_id = voice.id(),
                nodes = voice.node_count(),
                "voice reclaimed"
            );
            self.reclaimed += 1;
        }
    }

    fn build_voice(&mut self, note_id: u64, params: &SynthParams) -> VoiceGraph {
        let sample_rate = self.config.sample_rate as f32;
        let stages = params
            .oscillators
            .iter()
            .map(|spec| {
                let waveform = self.resolve_waveform(spec, params);
                (
                    OscNode::new(waveform, spec.detune_cents),
                    GainNode::with_envelope(spec.volume, &params.envelope, params.duration_seconds),
                )
            })
            .collect();

        VoiceGraph::new(
            note_id,
            params.base_frequency,
            params.duration_seconds,
            sample_rate,
            stages,
        )
    }

    /// Turn a spec into a playable waveform, falling back to a sine when
    /// the formula does not compile.
    fn resolve_waveform(&mut self, spec: &OscillatorSpec, params: &SynthParams) -> Waveform {
        let formula = match &spec.waveform {
            WaveformSource::Sine => return Waveform::Sine,
            WaveformSource::Formula(formula) => formula,
        };

        match self.compiled(formula) {
            Ok(compiled) => {
                let sample_rate = self.config.sample_rate as f32;
                let limit = PeriodicWave::harmonic_limit(
                    sample_rate,
                    params.peak_frequency(spec.detune_cents),
                );
                Waveform::Periodic(Arc::new(PeriodicWave::from_compiled(&compiled, limit)))
            }
            Err(error) => {
                warn!(%formula, %error, "formula failed to compile, using a sine");
                Waveform::Sine
            }
        }
    }

    fn compiled(
        &mut self,
        formula: &str,
    ) -> std::result::Result<Arc<CompiledWaveform>, CompilationError> {
        let sample_rate = self.config.sample_rate;
        self.waveforms
            .entry(formula.to_string())
            .or_insert_with(|| compile(formula, sample_rate).map(Arc::new))
            .clone()
    }
}

impl Drop for SynthEngine {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

/// Interleaved stereo audio from an offline render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl RenderedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_seconds(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn channel(&self, index: usize) -> impl Iterator<Item = f32> + '_ {
        self.samples
            .iter()
            .skip(index)
            .step_by(usize::from(self.channels.max(1)))
            .copied()
    }

    pub fn left(&self) -> Vec<f32> {
        self.channel(0).collect()
    }

    pub fn right(&self) -> Vec<f32> {
        self.channel(1).collect()
    }

    /// Average of both channels.
    pub fn mono(&self) -> Vec<f32> {
        self.channel(0)
            .zip(self.channel(1))
            .map(|(l, r)| 0.5 * (l + r))
            .collect()
    }
}

/// Render one note offline, start to end, without a device.
///
/// The note is retired by sample count, whatever `config.auto_stop` says.
pub fn render_note(config: &EngineConfig, params: &SynthParams) -> Result<RenderedAudio> {
    let config = EngineConfig {
        auto_stop: AutoStop::SampleClock,
        ..config.clone()
    };
    let sample_rate = config.sample_rate;
    let (mut engine, mut renderer) = SynthEngine::new(config)?;
    engine.start(params)?;

    let frames = (params.duration_seconds * sample_rate as f32).round() as usize;
    let mut samples = vec![0.0; frames * 2];
    renderer.fill_interleaved(&mut samples, 2);
    engine.poll();

    Ok(RenderedAudio {
        sample_rate,
        channels: 2,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> EngineConfig {
        EngineConfig::offline(8_000).with_seed(1)
    }

    #[test]
    fn stop_while_idle_is_a_noop() {
        let (mut engine, _renderer) = SynthEngine::new(offline()).expect("engine");
        engine.stop();
        engine.stop();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn invalid_params_are_rejected_before_playing() {
        let (mut engine, renderer) = SynthEngine::new(offline()).expect("engine");
        let params = SynthParams {
            duration_seconds: 0.0,
            ..SynthParams::default()
        };
        assert!(matches!(engine.start(&params), Err(SynthError::Validation(_))));
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(!renderer.has_voice());
    }

    #[test]
    fn formulas_are_compiled_once() {
        let (mut engine, _renderer) = SynthEngine::new(offline()).expect("engine");
        let params = SynthParams::two_oscillator_preset();
        engine.start(&params).expect("start");
        engine.start(&params).expect("restart");
        assert_eq!(engine.cached_formulas(), 2);
    }

    #[test]
    fn failed_formula_falls_back_to_sine() {
        let (mut engine, _renderer) = SynthEngine::new(offline()).expect("engine");
        let params = SynthParams {
            oscillators: vec![OscillatorSpec::formula("1/0", 0.5)],
            ..SynthParams::default()
        };
        let voice = engine.build_voice(1, &params);
        assert!(voice.stages()[0].0.waveform().is_sine());
    }

    #[test]
    fn wavetable_band_limited_to_note() {
        let (mut engine, _renderer) = SynthEngine::new(offline()).expect("engine");
        let params = SynthParams::default();
        let voice = engine.build_voice(1, &params);
        match voice.stages()[0].0.waveform() {
            Waveform::Periodic(wave) => {
                // 4000 Hz Nyquist / 220 Hz
                assert_eq!(wave.harmonics(), 18);
            }
            Waveform::Sine => panic!("formula should compile"),
        }
    }

    #[test]
    fn note_ids_increase() {
        let (mut engine, _renderer) = SynthEngine::new(offline()).expect("engine");
        let first = engine.start(&SynthParams::default()).expect("start");
        let second = engine.start(&SynthParams::default()).expect("start");
        assert!(second > first);
        assert_eq!(engine.state(), EngineState::Playing);
    }

    #[test]
    fn restart_retires_the_playing_voice() {
        let (mut engine, mut renderer) = SynthEngine::new(offline()).expect("engine");
        let mut left = vec![0.0; 256];
        let mut right = vec![0.0; 256];

        let first = engine.start(&SynthParams::default()).expect("start");
        renderer.fill(&mut left, &mut right);
        assert_eq!(renderer.voice_id(), Some(first));

        let second = engine.start(&SynthParams::default()).expect("restart");
        renderer.fill(&mut left, &mut right);
        assert_eq!(renderer.voice_id(), Some(second));
        assert!(engine.flags.has_finished(first));
        assert!(!engine.flags.has_finished(second));

        assert_eq!(engine.poll(), EngineState::Playing);
        assert_eq!(engine.reclaimed_voices(), 1);
    }

    #[test]
    fn full_queue_is_reported() {
        let (mut engine, _renderer) = SynthEngine::new(offline()).expect("engine");
        let params = SynthParams::default();
        let mut result = Ok(0);
        for _ in 0..=COMMAND_QUEUE_SIZE {
            result = engine.start(&params);
        }
        assert!(matches!(result, Err(SynthError::QueueFull)));
    }

    #[test]
    fn rendered_audio_has_stereo_frames() {
        let params = SynthParams {
            duration_seconds: 0.25,
            ..SynthParams::default()
        };
        let audio = render_note(&offline(), &params).expect("render");
        assert_eq!(audio.frames(), 2_000);
        assert_eq!(audio.samples.len(), 4_000);
        assert!(audio.samples.iter().all(|s| s.is_finite()));
        assert!((audio.duration_seconds() - 0.25).abs() < 1e-6);
    }
}
