use crate::dsp::{convolution::Convolver, delay::DelayLine, impulse::ImpulseResponse};

/*
Effect Chain
============

The voice's mono mix runs through two effects in series:

    mix ──▶ DelayLine ──▶ Convolver ──▶ left
                                   └──▶ right

There is no dry path. The delay shifts the whole signal later in time and
the convolver turns it into a stereo reverb tail; what you hear is the
fully wet result.

Delay Time
----------

The delay line is sized once for the longest delay the engine allows
(5 seconds by default) and the per-note delay is just a read offset:

    delay_seconds = 0.3 at 48 kHz  →  14,400 samples

Changing the delay between notes never allocates. Setting it to 0 makes
the delay line a pass-through.

Block Size
----------

The convolver works on fixed blocks. `process_block` must always be given
exactly `block_size()` samples; the renderer guarantees this.
*/

pub struct EffectChain {
    delay: DelayLine,
    delay_samples: usize,
    convolver: Convolver,
    sample_rate: f32,
}

impl EffectChain {
    pub fn new(
        ir: &ImpulseResponse,
        block_size: usize,
        max_delay_seconds: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            delay: DelayLine::for_duration(max_delay_seconds, sample_rate),
            delay_samples: 0,
            convolver: Convolver::new(ir, block_size, true),
            sample_rate,
        }
    }

    pub fn block_size(&self) -> usize {
        self.convolver.block_size()
    }

    pub fn set_delay_seconds(&mut self, seconds: f32) {
        let samples = (seconds.max(0.0) * self.sample_rate).round() as usize;
        self.delay_samples = samples.min(self.delay.max_delay());
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Delay `input` in place, then convolve it into `left` and `right`.
    pub fn process_block(&mut self, input: &mut [f32], left: &mut [f32], right: &mut [f32]) {
        self.delay.render(input, self.delay_samples);
        self.convolver.process_block(input, left, right);
    }

    pub fn reset(&mut self) {
        self.delay.reset();
        self.convolver.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn identity_ir() -> ImpulseResponse {
        ImpulseResponse::from_channels(vec![1.0], vec![1.0], SAMPLE_RATE as u32)
    }

    #[test]
    fn delay_then_convolve() {
        let ir = identity_ir();
        let gain = ir.normalization_gain();
        let mut chain = EffectChain::new(&ir, 16, 5.0, SAMPLE_RATE);
        chain.set_delay_seconds(0.02);
        assert_eq!(chain.delay_samples(), 20);

        let mut left = vec![0.0f32; 32];
        let mut right = vec![0.0f32; 32];
        let mut input = vec![0.0f32; 32];
        input[3] = 1.0;

        for ((x, l), r) in input
            .chunks_mut(16)
            .zip(left.chunks_mut(16))
            .zip(right.chunks_mut(16))
        {
            chain.process_block(x, l, r);
        }

        assert!((left[23] - gain).abs() < 1e-6);
        assert!((right[23] - gain).abs() < 1e-6);
        assert!(left[..23].iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn delay_is_capped_at_capacity() {
        let mut chain = EffectChain::new(&identity_ir(), 16, 5.0, SAMPLE_RATE);
        chain.set_delay_seconds(60.0);
        assert_eq!(chain.delay_samples(), 5_000);
    }

    #[test]
    fn zero_delay_keeps_timing() {
        let ir = identity_ir();
        let gain = ir.normalization_gain();
        let mut chain = EffectChain::new(&ir, 8, 5.0, SAMPLE_RATE);
        chain.set_delay_seconds(0.0);
        let mut input = [0.0f32; 8];
        input[0] = 1.0;
        let mut left = [0.0f32; 8];
        let mut right = [0.0f32; 8];
        chain.process_block(&mut input, &mut left, &mut right);
        assert!((left[0] - gain).abs() < 1e-6);
    }
}
