use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DialogueError, DialogueResult};

/// The recognition boundary: an audio file path in, recognized text out.
///
/// No retries happen here; retry policy belongs to the orchestrator.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> DialogueResult<String>;
}

/// Request body sent to the recognition endpoint
#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    audiofile_path: &'a str,
}

/// Response body returned by the recognition endpoint
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    status: String,
    #[serde(default)]
    transcription: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the external recognition model
pub struct HttpTranscriber {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranscriber {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> DialogueResult<String> {
        // Path resolution is the only local validation; content checks are the model's job
        if !audio_path.exists() {
            return Err(DialogueError::InvalidInput(format!(
                "audio file not found: {}",
                audio_path.display()
            )));
        }

        let path_str = audio_path.to_string_lossy();
        let request = RecognizeRequest {
            audiofile_path: path_str.as_ref(),
        };

        debug!("Sending recognition request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DialogueError::TranscriptionUnavailable(e.to_string()))?;

        let status = response.status();
        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| DialogueError::TranscriptionRejected(format!("bad response body: {}", e)))?;

        if !status.is_success() || body.status != "OK" {
            let message = body
                .message
                .unwrap_or_else(|| format!("recognition endpoint returned HTTP {}", status));
            warn!("Recognition rejected: {}", message);
            return Err(DialogueError::TranscriptionRejected(message));
        }

        match body.transcription {
            Some(text) => {
                info!("Recognition result: '{}'", text);
                Ok(text)
            }
            None => Err(DialogueError::TranscriptionRejected(
                "status OK but no transcription in response".to_string(),
            )),
        }
    }
}

/// Scripted outcome for the mock recognizer
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Text(String),
    Unavailable,
    Rejected(String),
    /// Never answers; used to exercise the orchestrator timeout
    Hang,
}

/// In-process recognizer for tests and offline runs
#[derive(Default)]
pub struct MockTranscriber {
    script: Mutex<VecDeque<MockOutcome>>,
    default_text: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockTranscriber {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            default_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn scripted(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> DialogueResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("Mock recognizing: {}", audio_path.display());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().expect("mock script lock").pop_front();
        match next {
            Some(MockOutcome::Text(text)) => Ok(text),
            Some(MockOutcome::Unavailable) => Err(DialogueError::TranscriptionUnavailable(
                "scripted outage".to_string(),
            )),
            Some(MockOutcome::Rejected(message)) => {
                Err(DialogueError::TranscriptionRejected(message))
            }
            Some(MockOutcome::Hang) => {
                // Sleep long enough that any sane timeout fires first
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DialogueError::TranscriptionUnavailable(
                    "hung request resumed".to_string(),
                ))
            }
            None => match &self.default_text {
                Some(text) => Ok(text.clone()),
                None => Err(DialogueError::TranscriptionRejected(
                    "mock script exhausted".to_string(),
                )),
            },
        }
    }
}
