use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub recognizer: RecognizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Directory where recorded turns are flushed as WAV files
    pub temp_dir: String,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognizerConfig {
    /// Recognition endpoint accepting {"audiofile_path": ...}
    pub endpoint: String,
    /// How long to wait for a transcription result before failing the turn
    pub request_timeout_secs: u64,
    /// Re-issue the request once when the endpoint is unreachable
    pub retry_on_unavailable: bool,
}

impl Config {
    /// Load configuration: defaults, then an optional file, then MULTITALK_* env overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "multitalk")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 5000i64)?
            .set_default("audio.temp_dir", "_temp_audio")?
            .set_default("audio.sample_rate", 16000i64)?
            .set_default("audio.channels", 1i64)?
            .set_default("recognizer.endpoint", "http://localhost:5001/transcribe")?
            .set_default("recognizer.request_timeout_secs", 60i64)?
            .set_default("recognizer.retry_on_unavailable", true)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("MULTITALK").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let cfg = Config::load("config/does-not-exist").unwrap();
        assert_eq!(cfg.service.http.port, 5000);
        assert_eq!(cfg.audio.sample_rate, 16000);
        assert_eq!(cfg.audio.channels, 1);
        assert_eq!(cfg.recognizer.request_timeout_secs, 60);
        assert!(cfg.recognizer.retry_on_unavailable);
    }
}
