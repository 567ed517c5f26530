use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use super::dialogue::{DialogueState, Utterance};
use super::turn::Turn;
use crate::audio::RecordingHandle;
use crate::error::{DialogueError, DialogueResult};

/// Unique identifier for one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> DialogueResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DialogueError::InvalidInput(format!("not a session id: {}", s)))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-session status
///
/// `Ready` means the last turn resolved successfully and its transcript is
/// available; it admits `begin_turn` the same way `Idle` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Recording,
    Transcribing,
    Ready,
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Transcribing => "transcribing",
            Self::Ready => "ready",
            Self::Closed => "closed",
        }
    }
}

/// Read-only view of a session, returned by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub turn_count: usize,
    pub turns: Vec<Turn>,
}

/// One conversation: an ordered, gapless sequence of turns plus dialogue state.
///
/// State machine: idle → recording → transcribing → ready (success) or
/// idle (failure); close is terminal from any state.
pub struct Session {
    pub id: SessionId,
    status: SessionStatus,
    turns: Vec<Turn>,
    dialogue: DialogueState,
    created_at: DateTime<Utc>,
    recording: Option<RecordingHandle>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            status: SessionStatus::Idle,
            turns: Vec::new(),
            dialogue: DialogueState::new(),
            created_at: Utc::now(),
            recording: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn dialogue(&self) -> &DialogueState {
        &self.dialogue
    }

    fn set_status(&mut self, status: SessionStatus) {
        if self.status != status {
            info!(
                "Session {}: {} -> {}",
                self.id,
                self.status.as_str(),
                status.as_str()
            );
            self.status = status;
        }
    }

    fn invalid_state(&self, expected: &'static str) -> DialogueError {
        DialogueError::InvalidState {
            expected,
            actual: self.status.as_str(),
        }
    }

    /// Open a new pending turn. Admitted from `Idle` or `Ready` only.
    pub fn begin_turn(&mut self, recording: Option<RecordingHandle>) -> DialogueResult<u64> {
        match self.status {
            SessionStatus::Idle | SessionStatus::Ready => {}
            _ => return Err(self.invalid_state("idle")),
        }

        let index = self.turns.len() as u64;
        self.turns.push(Turn::new(index));
        self.recording = recording;
        self.set_status(SessionStatus::Recording);
        Ok(index)
    }

    /// Take the in-flight recording handle, if any
    pub fn take_recording(&mut self) -> Option<RecordingHandle> {
        self.recording.take()
    }

    /// Attach the captured audio to the current turn and enter `Transcribing`
    pub fn start_transcribing(&mut self, audio_path: PathBuf) -> DialogueResult<()> {
        if self.status != SessionStatus::Recording {
            return Err(self.invalid_state("recording"));
        }
        if let Some(turn) = self.turns.last_mut() {
            turn.audio_path = Some(audio_path);
        }
        self.set_status(SessionStatus::Transcribing);
        Ok(())
    }

    /// Apply exactly one outcome to the current turn.
    ///
    /// A result is only valid while `Transcribing`; anything else (a result
    /// arriving early, after the turn resolved, or after close) is an
    /// ordering anomaly and returns false without touching the session.
    pub fn resolve(&mut self, result: &DialogueResult<String>) -> bool {
        if self.status != SessionStatus::Transcribing {
            warn!(
                "Session {}: result arrived while {}, ignoring",
                self.id,
                self.status.as_str()
            );
            return false;
        }
        let Some(turn) = self.turns.last_mut() else {
            warn!("Session {}: result arrived with no turn open", self.id);
            return false;
        };

        let applied = match result {
            Ok(text) => turn.resolve_success(text.clone()),
            Err(e) => turn.resolve_failed(e.kind()),
        };

        if !applied {
            return false;
        }

        match result {
            Ok(text) => {
                let index = turn.index;
                self.dialogue.append(index, text.clone());
                self.set_status(SessionStatus::Ready);
            }
            Err(e) => {
                info!("Session {}: turn failed ({})", self.id, e.kind());
                self.set_status(SessionStatus::Idle);
            }
        }
        true
    }

    /// Fail the pending turn from `Recording` when its audio never reached disk
    pub fn abort_turn(&mut self, kind: &str) {
        if let Some(turn) = self.turns.last_mut() {
            if turn.resolve_failed(kind) {
                info!("Session {}: turn aborted ({})", self.id, kind);
            }
        }
        self.set_status(SessionStatus::Idle);
    }

    /// Drop the trailing turn if it never resolved, keeping indices gapless
    pub fn discard_pending(&mut self) {
        if matches!(self.turns.last(), Some(t) if !t.is_resolved()) {
            if let Some(turn) = self.turns.pop() {
                info!("Session {}: discarded pending turn {}", self.id, turn.index);
            }
        }
    }

    /// Terminal transition; reachable from any state
    pub fn close(&mut self) {
        self.set_status(SessionStatus::Closed);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            created_at: self.created_at,
            turn_count: self.turns.len(),
            turns: self.turns.clone(),
        }
    }

    pub fn transcript(&self) -> Vec<Utterance> {
        self.dialogue.history().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::turn::TurnOutcome;

    #[test]
    fn turn_indices_stay_gapless() {
        let mut session = Session::new(SessionId::new());

        for i in 0..3u64 {
            let index = session.begin_turn(None).unwrap();
            assert_eq!(index, i);
            session
                .start_transcribing(PathBuf::from("/tmp/a.wav"))
                .unwrap();
            assert!(session.resolve(&Ok(format!("turn {}", i))));
        }

        let indices: Vec<u64> = session.turns().iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn begin_turn_rejected_outside_idle() {
        let mut session = Session::new(SessionId::new());
        session.begin_turn(None).unwrap();

        let err = session.begin_turn(None).unwrap_err();
        assert!(matches!(err, DialogueError::InvalidState { .. }));
    }

    #[test]
    fn duplicate_result_is_ignored() {
        let mut session = Session::new(SessionId::new());
        session.begin_turn(None).unwrap();
        session
            .start_transcribing(PathBuf::from("/tmp/a.wav"))
            .unwrap();

        assert!(session.resolve(&Ok("first".to_string())));
        assert!(!session.resolve(&Ok("second".to_string())));

        let turn = session.turns().last().unwrap();
        assert_eq!(turn.transcript.as_deref(), Some("first"));
        assert_eq!(turn.outcome, TurnOutcome::Success);
    }

    #[test]
    fn result_before_transcribing_is_ignored() {
        let mut session = Session::new(SessionId::new());
        session.begin_turn(None).unwrap();

        // Still recording; no result may land yet
        assert!(!session.resolve(&Ok("ghost".to_string())));
        assert_eq!(session.status(), SessionStatus::Recording);
        assert!(!session.turns().last().unwrap().is_resolved());
    }

    #[test]
    fn failure_returns_session_to_idle() {
        let mut session = Session::new(SessionId::new());
        session.begin_turn(None).unwrap();
        session
            .start_transcribing(PathBuf::from("/tmp/a.wav"))
            .unwrap();

        let failed: DialogueResult<String> = Err(DialogueError::TranscriptionTimeout(5));
        assert!(session.resolve(&failed));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.dialogue().is_empty());
    }

    #[test]
    fn discard_pending_pops_unresolved_turn_only() {
        let mut session = Session::new(SessionId::new());
        session.begin_turn(None).unwrap();
        session
            .start_transcribing(PathBuf::from("/tmp/a.wav"))
            .unwrap();
        assert!(session.resolve(&Ok("kept".to_string())));

        session.begin_turn(None).unwrap();
        session.discard_pending();

        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].transcript.as_deref(), Some("kept"));
    }

    #[test]
    fn at_most_one_pending_turn() {
        let mut session = Session::new(SessionId::new());
        session.begin_turn(None).unwrap();

        let pending = session
            .turns()
            .iter()
            .filter(|t| !t.is_resolved())
            .count();
        assert_eq!(pending, 1);
        assert!(session.begin_turn(None).is_err());
    }
}
