pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transcribe;

pub use audio::{
    AudioDevice, AudioFile, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig,
    CaptureSource, Player, Recorder, RecordingHandle,
};
pub use config::Config;
pub use error::{DialogueError, DialogueResult};
pub use http::{create_router, AppState};
pub use session::{
    DialogueState, OrchestratorConfig, Session, SessionId, SessionOrchestrator, SessionSnapshot,
    SessionStatus, Speaker, Turn, TurnOutcome, Utterance,
};
pub use transcribe::{HttpTranscriber, MockOutcome, MockTranscriber, Transcriber};
