use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Resolution of one utterance cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Pending,
    Success,
    Failed { kind: String },
}

/// One record → transcribe cycle within a session.
///
/// Indices are monotonic and gapless within their session. A turn is
/// append-only until its outcome is set, then immutable.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub index: u64,
    pub audio_path: Option<PathBuf>,
    pub transcript: Option<String>,
    pub started_at: DateTime<Utc>,
    pub outcome: TurnOutcome,
}

impl Turn {
    pub fn new(index: u64) -> Self {
        Self {
            index,
            audio_path: None,
            transcript: None,
            started_at: Utc::now(),
            outcome: TurnOutcome::Pending,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome != TurnOutcome::Pending
    }

    /// Set a successful outcome; returns false if the turn was already resolved
    pub fn resolve_success(&mut self, text: String) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.transcript = Some(text);
        self.outcome = TurnOutcome::Success;
        true
    }

    /// Set a failed outcome; returns false if the turn was already resolved
    pub fn resolve_failed(&mut self, kind: &str) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.outcome = TurnOutcome::Failed {
            kind: kind.to_string(),
        };
        true
    }
}
