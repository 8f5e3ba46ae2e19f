//! Speech-to-text: outcome classification and backend client

mod client;

pub use client::RecognitionClient;

use async_trait::async_trait;

use crate::audio::RecognitionPayload;

/// Default language tag sent to the backend
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Classified result of one recognition attempt
///
/// Exactly one variant per capture attempt; the boundary never leaks raw
/// transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Backend produced text; always non-empty and trimmed
    Transcript(String),
    /// Backend could not map the audio to any text
    NoSpeechDetected,
    /// Transport, timeout, quota, or malformed-response failure
    BackendError(String),
}

/// Submits encoded audio to a transcription backend
///
/// The session loop depends on this seam so mode handling can be tested with
/// canned outcomes.
#[async_trait]
pub trait Recognizer {
    /// Submit a payload and classify the backend's response
    ///
    /// Infallible at the type level: every failure mode is folded into
    /// [`RecognitionOutcome::BackendError`].
    async fn recognize(&self, payload: &RecognitionPayload) -> RecognitionOutcome;
}
