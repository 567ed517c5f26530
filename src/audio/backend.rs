use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::audio::file::AudioFile;
use crate::error::{DialogueError, DialogueResult};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (recognition models expect 16kHz)
    pub sample_rate: u32,
    /// Target channel count (1 = mono)
    pub channels: u16,
    /// Frame size in milliseconds (affects latency)
    pub frame_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            frame_duration_ms: 100,
        }
    }
}

/// Microphone capture backend
///
/// Implementations:
/// - Silence: paced synthetic frames (no hardware present; tests)
/// - File: replay a WAV file as if it were captured live
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> DialogueResult<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> DialogueResult<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Capture source selection
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Synthetic silent input, paced in real time
    Silence,
    /// Replay a WAV file as captured input
    File(PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(
        source: CaptureSource,
        config: CaptureConfig,
    ) -> DialogueResult<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::Silence => Ok(Box::new(SilenceBackend::new(config))),
            CaptureSource::File(path) => {
                if !path.exists() {
                    return Err(DialogueError::DeviceUnavailable(format!(
                        "capture file not found: {}",
                        path.display()
                    )));
                }
                Ok(Box::new(FileBackend::new(path, config)))
            }
        }
    }
}

/// Emits silent frames at the configured frame pace until stopped
pub struct SilenceBackend {
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
}

impl SilenceBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SilenceBackend {
    async fn start(&mut self) -> DialogueResult<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(32);
        self.capturing.store(true, Ordering::SeqCst);

        let capturing = Arc::clone(&self.capturing);
        let config = self.config.clone();
        let samples_per_frame = (config.sample_rate as u64 * config.frame_duration_ms / 1000)
            as usize
            * config.channels as usize;

        tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_millis(config.frame_duration_ms));

            while capturing.load(Ordering::SeqCst) {
                ticker.tick().await;
                let frame = AudioFrame {
                    samples: vec![0i16; samples_per_frame],
                    sample_rate: config.sample_rate,
                    channels: config.channels,
                    timestamp_ms,
                };
                timestamp_ms += config.frame_duration_ms;
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> DialogueResult<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "silence"
    }
}

/// Replays a WAV file as capture input, then closes the frame channel
pub struct FileBackend {
    path: PathBuf,
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
}

impl FileBackend {
    pub fn new(path: PathBuf, config: CaptureConfig) -> Self {
        Self {
            path,
            config,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileBackend {
    async fn start(&mut self) -> DialogueResult<mpsc::Receiver<AudioFrame>> {
        let audio = AudioFile::open(&self.path)?;
        let (tx, rx) = mpsc::channel(32);
        self.capturing.store(true, Ordering::SeqCst);

        let capturing = Arc::clone(&self.capturing);
        let frames = audio.frames(self.config.frame_duration_ms);

        tokio::spawn(async move {
            for frame in frames {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            capturing.store(false, Ordering::SeqCst);
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> DialogueResult<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
