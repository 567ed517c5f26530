//! HTTP API for the transcription service and dialogue control
//!
//! - GET  /health - Health check
//! - POST /transcribe - Single-turn transcription (implicit session)
//! - POST /play - Play an audio clip through the shared device
//! - POST /sessions - Start a dialogue session
//! - POST /sessions/:id/turns - Begin a turn (starts capture)
//! - POST /sessions/:id/audio - Submit turn audio, wait for the transcript
//! - GET  /sessions/:id - Session status snapshot
//! - GET  /sessions/:id/transcript - Accumulated dialogue history
//! - DELETE /sessions/:id - Close a session

pub mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
