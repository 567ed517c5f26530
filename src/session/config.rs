use std::path::PathBuf;
use std::time::Duration;

use crate::audio::CaptureSource;
use crate::config::Config;

/// Configuration for the session orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Where recorded turns are flushed as WAV files
    pub temp_dir: PathBuf,

    /// Sample rate for captured audio (recognition models expect 16kHz)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono)
    pub channels: u16,

    /// How long to wait for a transcription result before failing the turn
    pub request_timeout: Duration,

    /// Re-issue the request once when the endpoint is unreachable
    pub retry_on_unavailable: bool,

    /// Where turn audio is captured from
    pub capture_source: CaptureSource,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("_temp_audio"),
            sample_rate: 16000,
            channels: 1,
            request_timeout: Duration::from_secs(60),
            retry_on_unavailable: true,
            capture_source: CaptureSource::Silence,
        }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            temp_dir: PathBuf::from(&cfg.audio.temp_dir),
            sample_rate: cfg.audio.sample_rate,
            channels: cfg.audio.channels,
            request_timeout: Duration::from_secs(cfg.recognizer.request_timeout_secs),
            retry_on_unavailable: cfg.recognizer.retry_on_unavailable,
            capture_source: CaptureSource::Silence,
        }
    }
}
