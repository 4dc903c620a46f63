use std::path::Path;

use tracing::info;

use crate::{error::Result, synth::engine::RenderedAudio};

/// Write `audio` as a 32-bit float WAV file.
pub fn write_wav(path: impl AsRef<Path>, audio: &RenderedAudio) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!(path = %path.display(), frames = audio.frames(), "wrote wav file");
    Ok(())
}
