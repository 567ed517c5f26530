use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Single-turn transcription
        .route("/transcribe", post(handlers::transcribe))
        // Clip playback through the shared device
        .route("/play", post(handlers::play))
        // Session lifecycle
        .route("/sessions", post(handlers::start_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::end_session),
        )
        .route("/sessions/:session_id/turns", post(handlers::begin_turn))
        .route("/sessions/:session_id/audio", post(handlers::submit_audio))
        .route(
            "/sessions/:session_id/transcript",
            get(handlers::get_transcript),
        )
        // Request logging + permissive CORS
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
