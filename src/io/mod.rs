// Purpose - external interfaces: the audio device and WAV files

/// Default cpal output device.
pub mod device;
/// 32-bit float WAV output.
pub mod wav;

pub use device::{OutputDevice, OutputStream};
pub use wav::write_wav;
