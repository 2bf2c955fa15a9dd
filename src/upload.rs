//! Upload-and-poll control for server-side media processing.
//!
//! Submits the staged artifact, then waits for the service to finish
//! processing it: sleep one interval, re-fetch state, up to a bounded
//! number of re-fetches. Failure and timeout are fatal for the current
//! run; re-uploading is the caller's decision.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::config::PollingConfig;
use crate::pipeline::PipelineError;
use crate::progress::{PipelineEvent, ProgressReporter};
use crate::service::{LectureService, MediaFile, MediaState};

/// MIME type for an audio upload, inferred from the file suffix.
///
/// Unrecognized suffixes (including stdin's `-`) fall back to
/// `application/octet-stream` and let the service decide.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Upload `path` and block (cooperatively) until the artifact is ready.
///
/// The initial upload may already report the artifact ready, in which case
/// no status call is made. While pending, sleeps `interval_secs` and
/// re-fetches, at most `max_polls` times; still pending after the final
/// re-fetch is a [`PipelineError::ProcessingTimeout`]. A failed state at
/// any point is [`PipelineError::ProcessingFailed`]. The returned record
/// is always ready for generation.
pub async fn submit_and_await_ready(
    service: &dyn LectureService,
    path: &Path,
    mime_type: &str,
    polling: &PollingConfig,
    reporter: &dyn ProgressReporter,
) -> Result<MediaFile, PipelineError> {
    let file = service
        .upload(path, mime_type)
        .await
        .map_err(PipelineError::Upload)?;
    debug!(name = %file.name, mime_type, "media uploaded");

    let interval = Duration::from_secs(polling.interval_secs);
    let mut state = file.state;
    let mut polls = 0u32;

    loop {
        match state {
            MediaState::Ready => {
                debug!(name = %file.name, polls, "media ready");
                return Ok(MediaFile {
                    state: MediaState::Ready,
                    ..file
                });
            }
            MediaState::Failed => return Err(PipelineError::ProcessingFailed),
            MediaState::Pending => {
                if polls >= polling.max_polls {
                    return Err(PipelineError::ProcessingTimeout {
                        polls,
                        waited: interval * polls,
                    });
                }
                polls += 1;
                reporter.report(PipelineEvent::AwaitingProcessing {
                    poll: polls,
                    max: polling.max_polls,
                });
                tokio::time::sleep(interval).await;
                state = service
                    .media_state(&file.name)
                    .await
                    .map_err(PipelineError::Upload)?;
            }
        }
    }
}
