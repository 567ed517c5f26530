use super::state::AppState;
use crate::error::{DialogueError, DialogueResult};
use crate::session::{SessionId, SessionSnapshot, Utterance};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    /// Path to an audio file readable by the recognition service
    #[serde(default)]
    pub audiofile_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session_id: SessionId,
    pub status: String,
}

// ============================================================================
// Handlers
// ============================================================================

fn required_path(req: TranscribeRequest) -> DialogueResult<PathBuf> {
    match req.audiofile_path {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(DialogueError::InvalidInput(
            "missing 'audiofile_path'".to_string(),
        )),
    }
}

fn parse_id(id: &str) -> DialogueResult<SessionId> {
    SessionId::parse(id)
}

/// GET /health
/// Liveness only; never probes the recognition endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /transcribe
/// Single-turn synchronous path over an implicit session
pub async fn transcribe(
    State(state): State<AppState>,
    Json(req): Json<TranscribeRequest>,
) -> DialogueResult<Json<TranscribeResponse>> {
    let audio_path = required_path(req)?;
    info!("Transcribe request for {}", audio_path.display());

    let text = state.orchestrator.run_single_turn(audio_path).await?;
    Ok(Json(TranscribeResponse { text }))
}

/// POST /play
/// Play an audio file through the shared device; returns once the clip ends.
/// Fails with DeviceBusy while a recording holds the device.
pub async fn play(
    State(state): State<AppState>,
    Json(req): Json<TranscribeRequest>,
) -> DialogueResult<Json<PlayResponse>> {
    let audio_path = required_path(req)?;
    info!("Play request for {}", audio_path.display());

    state.orchestrator.play(&audio_path).await?;
    Ok(Json(PlayResponse { status: "done" }))
}

/// POST /sessions
/// Start a new dialogue session
pub async fn start_session(State(state): State<AppState>) -> Json<StartSessionResponse> {
    let session_id = state.orchestrator.start_session().await;
    Json(StartSessionResponse {
        session_id,
        status: "idle".to_string(),
    })
}

/// POST /sessions/:id/turns
/// Begin a new turn: starts audio capture for the session
pub async fn begin_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DialogueResult<Json<SessionSnapshot>> {
    let id = parse_id(&id)?;
    state.orchestrator.begin_turn(id).await?;
    Ok(Json(state.orchestrator.snapshot(id).await?))
}

/// POST /sessions/:id/audio
/// Submit the turn's audio and block until the transcription resolves
pub async fn submit_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TranscribeRequest>,
) -> DialogueResult<Json<TranscribeResponse>> {
    let id = parse_id(&id)?;
    let audio_path = required_path(req)?;

    let text = state.orchestrator.submit_audio(id, audio_path).await?;
    Ok(Json(TranscribeResponse { text }))
}

/// GET /sessions/:id
/// Session status snapshot
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DialogueResult<Json<SessionSnapshot>> {
    let id = parse_id(&id)?;
    Ok(Json(state.orchestrator.snapshot(id).await?))
}

/// GET /sessions/:id/transcript
/// Accumulated dialogue history
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DialogueResult<Json<Vec<Utterance>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.orchestrator.transcript(id).await?))
}

/// DELETE /sessions/:id
/// Close a session; a recording in progress is force-stopped
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DialogueResult<Json<EndSessionResponse>> {
    let id = parse_id(&id)?;
    state.orchestrator.end_session(id).await?;
    Ok(Json(EndSessionResponse {
        session_id: id,
        status: "closed".to_string(),
    }))
}
