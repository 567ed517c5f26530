pub mod backend;
pub mod device;
pub mod file;
pub mod player;
pub mod recorder;

pub use backend::{
    AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, FileBackend,
    SilenceBackend,
};
pub use device::{AudioDevice, DeviceGuard};
pub use file::AudioFile;
pub use player::{PlaybackHandle, Player};
pub use recorder::{Recorder, RecordingHandle};
