use std::fs;
use std::io;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audio::backend::CaptureBackend;
use crate::audio::device::{AudioDevice, DeviceGuard};
use crate::error::{DialogueError, DialogueResult};

/// Records microphone input into a buffer and flushes it to a WAV file on stop
pub struct Recorder {
    device: AudioDevice,
    temp_dir: PathBuf,
    sample_rate: u32,
    channels: u16,
}

impl Recorder {
    pub fn new(device: AudioDevice, temp_dir: PathBuf, sample_rate: u32, channels: u16) -> Self {
        Self {
            device,
            temp_dir,
            sample_rate,
            channels,
        }
    }

    /// Begin capturing from the given backend
    ///
    /// Fails with DeviceBusy if playback holds the device, or
    /// DeviceUnavailable if the backend cannot start.
    pub async fn start(
        &self,
        mut backend: Box<dyn CaptureBackend>,
    ) -> DialogueResult<RecordingHandle> {
        fs::create_dir_all(&self.temp_dir)?;

        let guard = self.device.try_acquire()?;
        let mut frame_rx = backend.start().await?;

        info!("Recording started (backend: {})", backend.name());

        let (stop_tx, mut stop_rx) = watch::channel(false);

        // Drain capture frames into a buffer until stopped or the backend closes
        let drain = tokio::spawn(async move {
            let mut samples: Vec<i16> = Vec::new();
            loop {
                tokio::select! {
                    maybe_frame = frame_rx.recv() => match maybe_frame {
                        Some(frame) => samples.extend_from_slice(&frame.samples),
                        None => break,
                    },
                    _ = stop_rx.changed() => break,
                }
            }
            if let Err(e) = backend.stop().await {
                warn!("Failed to stop capture backend: {}", e);
            }
            samples
        });

        let out_path = self
            .temp_dir
            .join(format!("asr_{}.wav", Uuid::new_v4().simple()));

        Ok(RecordingHandle {
            stop_tx,
            drain: Some(drain),
            guard: Some(guard),
            out_path,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}

/// Handle for one in-progress recording. Stopping flushes the buffer to disk
/// and returns the file path; a second stop fails with RecordingNotActive.
#[derive(Debug)]
pub struct RecordingHandle {
    stop_tx: watch::Sender<bool>,
    drain: Option<JoinHandle<Vec<i16>>>,
    guard: Option<DeviceGuard>,
    out_path: PathBuf,
    sample_rate: u32,
    channels: u16,
}

impl RecordingHandle {
    pub fn is_active(&self) -> bool {
        self.drain.is_some()
    }

    /// Stop capturing, flush the buffered samples to a WAV file, release the device
    pub async fn stop(&mut self) -> DialogueResult<PathBuf> {
        let drain = self.drain.take().ok_or(DialogueError::RecordingNotActive)?;
        let _ = self.stop_tx.send(true);

        let samples = drain.await.map_err(|e| {
            DialogueError::DeviceUnavailable(format!("capture task failed: {}", e))
        })?;

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(&self.out_path, spec)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        for &sample in &samples {
            writer
                .write_sample(sample)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        self.guard.take();

        info!(
            "Recording flushed: {} ({} samples)",
            self.out_path.display(),
            samples.len()
        );

        Ok(self.out_path.clone())
    }

    /// Forced stop: end capture and release the device without writing a file
    pub async fn discard(&mut self) {
        if let Some(drain) = self.drain.take() {
            let _ = self.stop_tx.send(true);
            let _ = drain.await;
            info!("Recording discarded: {}", self.out_path.display());
        }
        self.guard.take();
    }
}
