//! Typed contract with the remote inference service.
//!
//! Everything the pipeline knows about the remote side goes through
//! [`LectureService`]. The concrete Gemini adapter lives in [`crate::gemini`];
//! tests substitute scripted implementations. Errors carry an explicit
//! discriminated kind so no caller ever classifies failures by parsing
//! message strings.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Remote record of an uploaded media artifact.
///
/// `state` is the processing state at the time the record was fetched;
/// re-fetch with [`LectureService::media_state`] to observe transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Service-side resource name (e.g. `"files/abc123"`).
    pub name: String,
    /// Download/reference URI used in generation requests.
    pub uri: String,
    /// MIME type the service associated with the upload.
    pub mime_type: String,
    /// Processing state when this record was produced.
    pub state: MediaState,
}

/// Server-side processing state of an uploaded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    /// Still being processed; not yet usable for generation.
    Pending,
    /// Processed and usable for generation.
    Ready,
    /// Processing failed; the artifact is unusable.
    Failed,
}

/// Failure reported by the remote service, classified by kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// HTTP 429: capacity exhausted. The only retryable kind.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// HTTP 404 on a generation call: the model id is not available
    /// to this credential.
    #[error("model '{model}' not found")]
    ModelNotFound { model: String },

    /// Any other non-success HTTP status.
    #[error("service error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure: the request never produced an HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// A success response whose body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The local upload source could not be read.
    #[error("could not read upload source: {0}")]
    Io(String),
}

impl ServiceError {
    /// Whether the generation client may re-attempt after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::RateLimited { .. })
    }
}

/// The remote operations the pipeline consumes.
///
/// Implementations must be safe to call from a single in-flight pipeline;
/// no operation is expected to be idempotent except [`media_state`].
///
/// [`media_state`]: LectureService::media_state
#[async_trait]
pub trait LectureService: Send + Sync {
    /// Upload the file at `path` with the given MIME type.
    ///
    /// The returned record carries the initial processing state, which
    /// may already be [`MediaState::Ready`].
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<MediaFile, ServiceError>;

    /// Re-fetch the processing state of a previously uploaded artifact.
    async fn media_state(&self, name: &str) -> Result<MediaState, ServiceError>;

    /// Run one generation request against a ready artifact.
    ///
    /// Returns the completion text, which may be empty; deciding whether
    /// an empty completion is a failure is the caller's concern.
    async fn generate(
        &self,
        file: &MediaFile,
        prompt: &str,
        model: &str,
    ) -> Result<String, ServiceError>;

    /// List the model ids available to the configured credential.
    ///
    /// Used for diagnostic output after a fatal error, not for validation.
    async fn list_models(&self) -> Result<Vec<String>, ServiceError>;
}
