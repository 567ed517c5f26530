//! Dialogue session management
//!
//! This module provides the turn-cycle core:
//! - `Session`: per-conversation state machine with a gapless turn sequence
//! - `DialogueState`: accumulated transcript history and speaker rotation
//! - `SessionOrchestrator`: coordinates capture, transcription, and turn
//!   transitions under per-session serialization

mod config;
mod dialogue;
mod orchestrator;
mod session;
mod turn;

pub use config::OrchestratorConfig;
pub use dialogue::{DialogueState, Speaker, Utterance};
pub use orchestrator::SessionOrchestrator;
pub use session::{Session, SessionId, SessionSnapshot, SessionStatus};
pub use turn::{Turn, TurnOutcome};
