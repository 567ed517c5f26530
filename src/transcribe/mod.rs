//! Recognition boundary client
//!
//! Sends an audio file path to the external speech-to-text endpoint and
//! returns the recognized text or a typed failure.

mod client;

pub use client::{HttpTranscriber, MockOutcome, MockTranscriber, Transcriber};
