// Integration tests for the HTTP surface
//
// The router is exercised in-process with tower's oneshot, against a
// scripted recognizer.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use multitalk::{
    create_router, AppState, CaptureSource, MockOutcome, MockTranscriber, OrchestratorConfig,
    SessionOrchestrator, Transcriber,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(temp_dir: &TempDir, mock: MockTranscriber) -> Router {
    let config = OrchestratorConfig {
        temp_dir: temp_dir.path().to_path_buf(),
        sample_rate: 16000,
        channels: 1,
        request_timeout: Duration::from_millis(200),
        retry_on_unavailable: true,
        capture_source: CaptureSource::Silence,
    };
    let orchestrator = Arc::new(SessionOrchestrator::new(
        config,
        Arc::new(mock) as Arc<dyn Transcriber>,
    ));
    create_router(AppState::new(orchestrator))
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(v) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_returns_ok() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn transcribe_returns_recognized_text() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("hello world"));

    let (status, body) = send_json(
        &app,
        "POST",
        "/transcribe",
        Some(json!({"audiofile_path": "/tmp/a.wav"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hello world");
}

#[tokio::test]
async fn transcribe_without_path_is_invalid_input() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let (status, body) = send_json(&app, "POST", "/transcribe", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidInput");
}

#[tokio::test]
async fn transcribe_with_empty_path_is_invalid_input() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let (status, body) = send_json(
        &app,
        "POST",
        "/transcribe",
        Some(json!({"audiofile_path": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidInput");
}

#[tokio::test]
async fn transcribe_maps_unavailable_to_502() {
    let temp = TempDir::new().unwrap();
    // Both the attempt and its single retry fail
    let app = test_app(
        &temp,
        MockTranscriber::scripted([MockOutcome::Unavailable, MockOutcome::Unavailable]),
    );

    let (status, body) = send_json(
        &app,
        "POST",
        "/transcribe",
        Some(json!({"audiofile_path": "/tmp/a.wav"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "TranscriptionUnavailable");
}

#[tokio::test]
async fn transcribe_maps_timeout_to_504() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::scripted([MockOutcome::Hang]));

    let (status, body) = send_json(
        &app,
        "POST",
        "/transcribe",
        Some(json!({"audiofile_path": "/tmp/a.wav"})),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "TranscriptionTimeout");
}

#[tokio::test]
async fn play_returns_after_the_clip_ends() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    // 100ms of silence
    let path = temp.path().join("clip.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..1600 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        "/play",
        Some(json!({"audiofile_path": path.to_str().unwrap()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
}

#[tokio::test]
async fn play_missing_file_is_invalid_input() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let (status, body) = send_json(
        &app,
        "POST",
        "/play",
        Some(json!({"audiofile_path": "/nonexistent/clip.wav"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidInput");
}

#[tokio::test]
async fn session_lifecycle_over_http() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("good morning"));

    // Start a session
    let (status, body) = send_json(&app, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["session_id"].as_str().unwrap().to_string();

    // Status: idle
    let (status, body) = send_json(&app, "GET", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");

    // Begin a turn: capture starts
    let (status, body) =
        send_json(&app, "POST", &format!("/sessions/{}/turns", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "recording");

    // Submit audio, wait for resolution
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/sessions/{}/audio", id),
        Some(json!({"audiofile_path": "/tmp/a.wav"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "good morning");

    // Transcript holds one utterance
    let (status, body) =
        send_json(&app, "GET", &format!("/sessions/{}/transcript", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["text"], "good morning");
    assert_eq!(history[0]["speaker"], "user");

    // Close
    let (status, body) = send_json(&app, "DELETE", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    // Gone afterwards
    let (status, body) = send_json(&app, "GET", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn submit_audio_before_begin_turn_is_conflict() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let (_, body) = send_json(&app, "POST", "/sessions", None).await;
    let id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/sessions/{}/audio", id),
        Some(json!({"audiofile_path": "/tmp/a.wav"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidState");
}

#[tokio::test]
async fn malformed_session_id_is_invalid_input() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let (status, body) = send_json(&app, "GET", "/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidInput");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp, MockTranscriber::returning("unused"));

    let id = uuid::Uuid::new_v4();
    let (status, body) = send_json(&app, "DELETE", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}
