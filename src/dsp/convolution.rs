use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::dsp::impulse::ImpulseResponse;

/*
Partitioned Convolution
=======================

Convolution reverb plays every input sample back through the impulse
response: y[n] = Σ h[k]·x[n-k]. With a 2 second kernel at 48 kHz that is
96,000 multiply-adds per output sample, far too slow to do directly.

Vocabulary
----------

  kernel      The impulse response being convolved with (h).

  partition   A block-sized slice of the kernel. A 96,000 sample kernel
              split into 256 sample partitions gives 375 partitions.

  FDL         Frequency-domain delay line. The spectra of the most recent
              input blocks, newest first, one per partition.


Uniformly Partitioned Overlap-Save
----------------------------------

With block size B and FFT size N = 2B:

  1. Slide the input window: [previous block | current block]  (N samples)
  2. FFT the window and push its spectrum onto the FDL
  3. Multiply-accumulate:  Y = Σ  FDL[p] · H[p]     p = 0 .. partitions
  4. Inverse FFT Y; the LAST B samples are valid output, the first B are
     circular wrap-around and are discarded

    partition:   H[0]        H[1]        H[2]   ...
    input:      block n    block n-1   block n-2
                   ╲           ╲           ╲
                    ×           ×           ×     → Σ → IFFT → output

Each partition's contribution is delayed by exactly p blocks because it is
multiplied with the spectrum of the block p steps back. Output is aligned
with input (no added latency) as long as the caller always hands over
exactly B samples.


Stereo from Mono
----------------

The input spectrum is computed once and shared. Each kernel channel keeps
its own partition spectra, so a mono input produces a stereo output at the
cost of one extra multiply-accumulate and one extra inverse FFT per block.


Normalisation
-------------

When enabled, the kernel is scaled by `ImpulseResponse::normalization_gain`
before its spectra are taken, so the wet level doesn't depend on how loud
the random tail happened to be.
*/

pub struct Convolver {
    block_size: usize,
    fft_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    /// Kernel spectra per channel, one per partition.
    partitions: [Vec<Vec<Complex<f32>>>; 2],
    /// Input spectra, `fdl[head]` is the newest.
    fdl: Vec<Vec<Complex<f32>>>,
    head: usize,
    window: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    accumulator: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Convolver {
    /// Prepare a convolver for `ir`, processing `block_size` samples per
    /// call. `normalize` applies the kernel's power normalisation gain.
    pub fn new(ir: &ImpulseResponse, block_size: usize, normalize: bool) -> Self {
        let block_size = block_size.max(1);
        let fft_size = block_size * 2;

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        let gain = if normalize {
            ir.normalization_gain()
        } else {
            1.0
        };

        let partition_count = ir.len().div_ceil(block_size);
        let partitions = [0, 1].map(|channel| {
            ir.channel(channel)
                .chunks(block_size)
                .map(|chunk| {
                    let mut bins = vec![Complex::new(0.0, 0.0); fft_size];
                    for (bin, &tap) in bins.iter_mut().zip(chunk) {
                        *bin = Complex::new(tap * gain, 0.0);
                    }
                    forward.process_with_scratch(&mut bins, &mut scratch);
                    bins
                })
                .collect::<Vec<_>>()
        });

        Self {
            block_size,
            fft_size,
            forward,
            inverse,
            partitions,
            fdl: vec![vec![Complex::new(0.0, 0.0); fft_size]; partition_count],
            head: 0,
            window: vec![0.0; fft_size],
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            accumulator: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn partition_count(&self) -> usize {
        self.fdl.len()
    }

    /// Convolve one block. All three slices must be `block_size` long.
    pub fn process_block(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(input.len(), self.block_size);
        debug_assert_eq!(left.len(), self.block_size);
        debug_assert_eq!(right.len(), self.block_size);

        if self.fdl.is_empty() {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let b = self.block_size;
        self.window.copy_within(b.., 0);
        self.window[b..].copy_from_slice(input);

        self.head = (self.head + 1) % self.fdl.len();
        let newest = &mut self.fdl[self.head];
        for (bin, &sample) in newest.iter_mut().zip(&self.window) {
            *bin = Complex::new(sample, 0.0);
        }
        self.forward.process_with_scratch(newest, &mut self.scratch);

        self.accumulate(0);
        self.write_output(left);
        self.accumulate(1);
        self.write_output(right);
    }

    fn accumulate(&mut self, channel: usize) {
        let count = self.fdl.len();
        self.accumulator.fill(Complex::new(0.0, 0.0));
        for (p, kernel) in self.partitions[channel].iter().enumerate() {
            let input = &self.fdl[(self.head + count - p) % count];
            for ((acc, x), h) in self.accumulator.iter_mut().zip(input).zip(kernel) {
                *acc += x * h;
            }
        }
    }

    fn write_output(&mut self, out: &mut [f32]) {
        self.spectrum.copy_from_slice(&self.accumulator);
        self.inverse
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // rustfft leaves the inverse unscaled
        let scale = 1.0 / self.fft_size as f32;
        for (sample, bin) in out.iter_mut().zip(&self.spectrum[self.block_size..]) {
            *sample = bin.re * scale;
        }
    }

    /// Forget all input history (the reverb tail).
    pub fn reset(&mut self) {
        for spectrum in &mut self.fdl {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.window.fill(0.0);
        self.head = 0;
    }
}
