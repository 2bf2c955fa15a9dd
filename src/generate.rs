//! Generation with bounded retry against a rate-limiting service.
//!
//! Only rate limiting is worth waiting out. Each retryable failure
//! doubles the wait (base, 2x, 4x, ...), a missing model aborts with the
//! model id so the caller can suggest alternatives, and every other
//! failure aborts on the spot.

use std::time::Duration;

use tracing::warn;

use crate::config::GenerationConfig;
use crate::pipeline::PipelineError;
use crate::progress::{PipelineEvent, ProgressReporter};
use crate::service::{LectureService, MediaFile, ServiceError};

/// Ask the service to generate study material, retrying on rate limits.
///
/// Makes at most `max_retries` underlying calls. The wait before retry
/// `n` (1-based) is `base_delay_secs * 2^(n-1)`; there is no wait after
/// the final attempt. Exhausting the budget on rate limits is
/// [`PipelineError::ServerBusy`].
pub async fn generate_with_retry(
    service: &dyn LectureService,
    file: &MediaFile,
    prompt: &str,
    generation: &GenerationConfig,
    reporter: &dyn ProgressReporter,
) -> Result<String, PipelineError> {
    for attempt in 0..generation.max_retries {
        reporter.report(PipelineEvent::Generating {
            model: generation.model.clone(),
            attempt: attempt + 1,
            max: generation.max_retries,
        });
        match service.generate(file, prompt, &generation.model).await {
            Ok(text) => return Ok(text),
            Err(err) if err.is_retryable() => {
                warn!(
                    attempt = attempt + 1,
                    max = generation.max_retries,
                    %err,
                    "generation rate limited"
                );
                if attempt + 1 < generation.max_retries {
                    // Shift is clamped so a large retry budget cannot overflow.
                    let delay =
                        Duration::from_secs(generation.base_delay_secs << attempt.min(10));
                    reporter.report(PipelineEvent::RetryWait {
                        attempt: attempt + 1,
                        delay,
                    });
                    tokio::time::sleep(delay).await;
                }
            }
            Err(ServiceError::ModelNotFound { model }) => {
                return Err(PipelineError::ModelNotFound { model });
            }
            Err(err) => return Err(PipelineError::Generation(err)),
        }
    }
    Err(PipelineError::ServerBusy {
        attempts: generation.max_retries,
    })
}
