use hound::WavReader;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::audio::backend::AudioFrame;
use crate::error::{DialogueError, DialogueResult};

/// A fully decoded WAV file
#[derive(Debug)]
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> DialogueResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DialogueError::InvalidInput(format!(
                "audio file not found: {}",
                path.display()
            )));
        }

        let reader = WavReader::open(path).map_err(|e| {
            DialogueError::InvalidInput(format!("failed to open WAV {}: {}", path.display(), e))
        })?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                DialogueError::InvalidInput(format!(
                    "failed to read samples from {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {} ({:.1}s, {}Hz, {} channels)",
            path.display(),
            duration_seconds,
            spec.sample_rate,
            spec.channels
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }

    /// Slice the decoded samples into fixed-duration capture frames
    pub fn frames(&self, frame_duration_ms: u64) -> Vec<AudioFrame> {
        let samples_per_frame =
            (self.sample_rate as u64 * frame_duration_ms / 1000) as usize * self.channels as usize;
        if samples_per_frame == 0 {
            return Vec::new();
        }

        self.samples
            .chunks(samples_per_frame)
            .enumerate()
            .map(|(i, chunk)| AudioFrame {
                samples: chunk.to_vec(),
                sample_rate: self.sample_rate,
                channels: self.channels,
                timestamp_ms: i as u64 * frame_duration_ms,
            })
            .collect()
    }
}
