use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, SizedSample,
};
use tracing::{error, info};

use crate::{error::DeviceError, synth::renderer::Renderer};

/// The platform's default output device and its preferred config.
pub struct OutputDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

/// A running output stream. Audio stops when this is dropped.
pub struct OutputStream {
    _stream: cpal::Stream,
}

impl OutputDevice {
    pub fn open_default() -> Result<Self, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = config.sample_rate().0,
            channels = config.channels(),
            format = ?config.sample_format(),
            "opened output device"
        );
        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels()
    }

    /// Move `renderer` into the audio callback and start playing.
    pub fn play(self, renderer: Renderer) -> Result<OutputStream, DeviceError> {
        let config = self.config.config();
        let stream = match self.config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&self.device, &config, renderer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&self.device, &config, renderer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&self.device, &config, renderer)?,
            other => return Err(DeviceError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play()?;
        Ok(OutputStream { _stream: stream })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut renderer: Renderer,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let (left, right) = renderer.next_frame();
                write_frame(frame, left, right);
            }
        },
        |err| error!(%err, "output stream error"),
        None,
    )?;
    Ok(stream)
}

/// Stereo onto any channel count: mono gets the average, channels past
/// the second are silent.
fn write_frame<T: SizedSample + FromSample<f32>>(frame: &mut [T], left: f32, right: f32) {
    match frame {
        [mono] => *mono = T::from_sample(0.5 * (left + right)),
        [l, r, rest @ ..] => {
            *l = T::from_sample(left);
            *r = T::from_sample(right);
            for sample in rest {
                *sample = T::from_sample(0.0f32);
            }
        }
        [] => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frame_maps_channels() {
        let mut frame = [0.0f32; 4];
        write_frame(&mut frame, 0.25, -0.5);
        assert_eq!(frame, [0.25, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn mono_frame_averages() {
        let mut frame = [0.0f32; 1];
        write_frame(&mut frame, 0.5, 0.0);
        assert_eq!(frame, [0.25]);
    }

    #[test]
    fn integer_formats_convert() {
        let mut frame = [0i16; 2];
        write_frame(&mut frame, 1.0, 0.0);
        assert_eq!(frame[1], 0);
        assert!(frame[0] > 30_000);
    }
}
