/// Circular-buffer delay line.
///
/// The buffer is sized once for the longest delay the caller will ask for,
/// so rendering never allocates. Each sample is written before the delayed
/// sample is read, which makes a delay of zero an exact pass-through.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// A line that can delay by up to `max_delay_samples`.
    pub fn with_capacity(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples + 1],
            write_pos: 0,
        }
    }

    /// A line long enough for `max_seconds` at `sample_rate`.
    pub fn for_duration(max_seconds: f32, sample_rate: f32) -> Self {
        Self::with_capacity((max_seconds.max(0.0) * sample_rate).ceil() as usize)
    }

    /// Longest supported delay in samples.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay_samples = delay_samples.min(len - 1);

        self.buffer[self.write_pos] = sample;
        let read_pos = (self.write_pos + len - delay_samples) % len;
        let delayed = self.buffer[read_pos];
        self.write_pos = (self.write_pos + 1) % len;

        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: usize) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
