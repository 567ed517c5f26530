use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{info, warn};

use super::config::OrchestratorConfig;
use super::dialogue::Utterance;
use super::session::{Session, SessionId, SessionSnapshot, SessionStatus};
use crate::audio::{AudioDevice, CaptureBackendFactory, CaptureConfig, Player, Recorder};
use crate::error::{DialogueError, DialogueResult};
use crate::transcribe::Transcriber;

/// Coordinates audio capture, the recognition boundary, and per-session
/// dialogue state into a request/response turn cycle.
///
/// Sessions live behind independent mutexes: operations on one session are
/// serialized, sessions proceed in parallel. The audio device and the
/// transcriber are owned here and injected at construction.
pub struct SessionOrchestrator {
    config: OrchestratorConfig,
    transcriber: Arc<dyn Transcriber>,
    recorder: Recorder,
    player: Player,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionOrchestrator {
    pub fn new(config: OrchestratorConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        let device = AudioDevice::new();
        let recorder = Recorder::new(
            device.clone(),
            config.temp_dir.clone(),
            config.sample_rate,
            config.channels,
        );
        let player = Player::new(device);

        Self {
            config,
            transcriber,
            recorder,
            player,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new session in `idle` status
    pub async fn start_session(&self) -> SessionId {
        let id = SessionId::new();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(id, session);
        info!("Session {} started", id);
        id
    }

    async fn session(&self, id: SessionId) -> DialogueResult<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DialogueError::NotFound(id))
    }

    /// Open a new turn and start capturing audio for it
    pub async fn begin_turn(&self, id: SessionId) -> DialogueResult<u64> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;

        // Admission check before touching the device, so a losing concurrent
        // caller sees InvalidState rather than DeviceBusy
        match guard.status() {
            SessionStatus::Idle | SessionStatus::Ready => {}
            _ => {
                return Err(DialogueError::InvalidState {
                    expected: "idle",
                    actual: guard.status().as_str(),
                })
            }
        }

        let capture_config = CaptureConfig {
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            ..CaptureConfig::default()
        };
        let backend =
            CaptureBackendFactory::create(self.config.capture_source.clone(), capture_config)?;
        let handle = self.recorder.start(backend).await?;

        guard.begin_turn(Some(handle))
    }

    /// Stop the turn's recording, flush it to disk, and transcribe it
    pub async fn finish_turn(&self, id: SessionId) -> DialogueResult<String> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;

        if guard.status() != SessionStatus::Recording {
            return Err(DialogueError::InvalidState {
                expected: "recording",
                actual: guard.status().as_str(),
            });
        }

        let mut recording = guard
            .take_recording()
            .ok_or(DialogueError::RecordingNotActive)?;

        let audio_path = match recording.stop().await {
            Ok(path) => path,
            Err(e) => {
                // Flush failure still fails the turn before surfacing
                guard.abort_turn(e.kind());
                return Err(e);
            }
        };

        self.transcribe_current(&mut guard, audio_path).await
    }

    /// Submit caller-provided audio for the current turn.
    ///
    /// Fails with InvalidState unless the session is recording. Blocks until
    /// the transcription resolves or the configured timeout fires.
    pub async fn submit_audio(&self, id: SessionId, audio_path: PathBuf) -> DialogueResult<String> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;

        if guard.status() != SessionStatus::Recording {
            return Err(DialogueError::InvalidState {
                expected: "recording",
                actual: guard.status().as_str(),
            });
        }

        // Caller supplied the audio; any live capture is abandoned
        if let Some(mut recording) = guard.take_recording() {
            recording.discard().await;
        }

        self.transcribe_current(&mut guard, audio_path).await
    }

    /// Deliver an externally produced transcription result for the current turn.
    ///
    /// Duplicate results for an already-resolved turn are ignored and logged.
    pub async fn resolve_turn(
        &self,
        id: SessionId,
        result: DialogueResult<String>,
    ) -> DialogueResult<()> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        if !guard.resolve(&result) {
            warn!(
                "Session {}: duplicate transcription result ignored (ordering anomaly)",
                id
            );
        }
        Ok(())
    }

    /// Close a session. A recording in progress is force-stopped and the
    /// in-flight turn is discarded without an outcome.
    pub async fn end_session(&self, id: SessionId) -> DialogueResult<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(DialogueError::NotFound(id))?;

        let mut guard = session.lock().await;
        if let Some(mut recording) = guard.take_recording() {
            recording.discard().await;
            guard.discard_pending();
        }
        guard.close();
        info!("Session {} closed", id);
        Ok(())
    }

    /// Single-turn synchronous path used by POST /transcribe: an implicit
    /// session runs begin → submit → resolution → close and returns the text.
    pub async fn run_single_turn(&self, audio_path: PathBuf) -> DialogueResult<String> {
        let id = self.start_session().await;
        let session = self.session(id).await?;

        let result = {
            let mut guard = session.lock().await;
            // Audio already exists on disk, so capture is bypassed
            match guard.begin_turn(None) {
                Ok(_) => self.transcribe_current(&mut guard, audio_path).await,
                Err(e) => Err(e),
            }
        };

        self.end_session(id).await?;
        result
    }

    pub async fn snapshot(&self, id: SessionId) -> DialogueResult<SessionSnapshot> {
        let session = self.session(id).await?;
        let guard = session.lock().await;
        Ok(guard.snapshot())
    }

    pub async fn transcript(&self, id: SessionId) -> DialogueResult<Vec<Utterance>> {
        let session = self.session(id).await?;
        let guard = session.lock().await;
        Ok(guard.transcript())
    }

    /// Play an audio file through the shared device; recording attempts fail
    /// with DeviceBusy while playback holds it.
    pub async fn play(&self, audio_path: &Path) -> DialogueResult<()> {
        self.player.play(audio_path).await
    }

    /// Run one transcription for the session's current turn while the
    /// session lock is held, then apply exactly one outcome.
    async fn transcribe_current(
        &self,
        session: &mut Session,
        audio_path: PathBuf,
    ) -> DialogueResult<String> {
        session.start_transcribing(audio_path.clone())?;

        let result = self.request_transcription(&audio_path).await;

        if !session.resolve(&result) {
            warn!(
                "Session {}: duplicate transcription result ignored (ordering anomaly)",
                session.id
            );
        }

        result
    }

    /// One transcription request, retried at most once on unavailability
    async fn request_transcription(&self, audio_path: &Path) -> DialogueResult<String> {
        match self.attempt_transcription(audio_path).await {
            Err(DialogueError::TranscriptionUnavailable(reason))
                if self.config.retry_on_unavailable =>
            {
                warn!(
                    "Recognition endpoint unavailable ({}), retrying once",
                    reason
                );
                self.attempt_transcription(audio_path).await
            }
            other => other,
        }
    }

    /// A single bounded attempt. The result arrives over a per-request
    /// oneshot channel; on timeout the receiver is dropped and any late
    /// result is discarded.
    async fn attempt_transcription(&self, audio_path: &Path) -> DialogueResult<String> {
        let (result_tx, result_rx) = oneshot::channel();
        let transcriber = Arc::clone(&self.transcriber);
        let path = audio_path.to_path_buf();

        tokio::spawn(async move {
            let result = transcriber.transcribe(&path).await;
            let _ = result_tx.send(result);
        });

        match tokio::time::timeout(self.config.request_timeout, result_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(DialogueError::TranscriptionUnavailable(
                "result channel closed".to_string(),
            )),
            Err(_) => Err(DialogueError::TranscriptionTimeout(
                self.config.request_timeout.as_secs(),
            )),
        }
    }
}
