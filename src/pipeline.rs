//! End-to-end study set pipeline.
//!
//! Reads the recording, stages a private copy, uploads and awaits
//! processing, generates with retry, and partitions the completion. The
//! staged copy is a temp file owned by the pipeline; it is removed
//! exactly once on every exit path, success or failure.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use thiserror::Error;
use tokio::io::AsyncReadExt as _;
use tracing::debug;

use crate::config::Config;
use crate::gemini::GeminiService;
use crate::generate;
use crate::partition::{self, StudySet};
use crate::progress::{PipelineEvent, ProgressMode, ProgressReporter};
use crate::prompt;
use crate::service::{LectureService, ServiceError};
use crate::upload;

/// Everything that can stop a run short of a study set.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not upload media: {0}")]
    Upload(ServiceError),
    #[error("the service could not process this recording")]
    ProcessingFailed,
    #[error("media was still processing after {polls} status checks")]
    ProcessingTimeout { polls: u32, waited: Duration },
    #[error("model '{model}' was not found")]
    ModelNotFound { model: String },
    #[error("service stayed busy through {attempts} attempts")]
    ServerBusy { attempts: u32 },
    #[error("generation failed: {0}")]
    Generation(ServiceError),
    #[error("the service returned an empty completion")]
    EmptyCompletion,
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Produce a study set from the recording at `input` (`-` for stdin).
pub async fn run(
    service: &dyn LectureService,
    config: &Config,
    input: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<StudySet, PipelineError> {
    reporter.report(PipelineEvent::Reading {
        input: input.display().to_string(),
    });
    let bytes = read_input(input).await?;
    if bytes.is_empty() {
        return Err(PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "input is empty",
        )));
    }
    let mime_type = upload::mime_for_path(input);

    // Owned by this scope: dropped (and deleted) on every return below.
    let staged = stage_bytes(&bytes, input)?;
    debug!(staged = %staged.path().display(), mime_type, "staged input copy");

    reporter.report(PipelineEvent::Uploading {
        input: input.display().to_string(),
    });
    let file = upload::submit_and_await_ready(
        service,
        staged.path(),
        mime_type,
        &config.polling,
        reporter,
    )
    .await?;

    let prompt = prompt::build_prompt(config.generation.note_style());
    debug!(
        model = %config.generation.model,
        style = config.generation.note_style().name(),
        "requesting completion"
    );
    let completion =
        generate::generate_with_retry(service, &file, &prompt, &config.generation, reporter)
            .await?;
    drop(staged);

    if completion.trim().is_empty() {
        return Err(PipelineError::EmptyCompletion);
    }

    reporter.report(PipelineEvent::Partitioning);
    let set = partition::partition(&completion);
    reporter.report(PipelineEvent::Done);
    Ok(set)
}

/// CLI entry: run the pipeline against the configured service and
/// deliver the study set, with a remedy hint on stderr when it fails.
pub async fn run_notes(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    mode: ProgressMode,
) -> anyhow::Result<()> {
    let api_key = config.service.resolve_api_key()?;
    let service = GeminiService::new(&config.service, api_key)?;
    let reporter = mode.reporter();

    match run(&service, config, input, reporter.as_ref()).await {
        Ok(set) => write_study_set(&set, output),
        Err(err) => {
            print_remedy(&err, &service).await;
            Err(err.into())
        }
    }
}

async fn read_input(input: &Path) -> Result<Vec<u8>, PipelineError> {
    if input == Path::new("-") {
        let mut bytes = Vec::new();
        tokio::io::stdin().read_to_end(&mut bytes).await?;
        Ok(bytes)
    } else {
        Ok(tokio::fs::read(input).await?)
    }
}

/// Copy the input bytes to a temp file the upload can read.
///
/// The suffix follows the input so the staged name stays recognizable in
/// debug output. Deletion rides on [`tempfile::NamedTempFile`]'s drop.
fn stage_bytes(bytes: &[u8], input: &Path) -> Result<tempfile::NamedTempFile, PipelineError> {
    let suffix = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_else(|| ".bin".to_string());
    let mut staged = tempfile::Builder::new()
        .prefix("scribe-")
        .suffix(&suffix)
        .tempfile()?;
    staged.write_all(bytes)?;
    staged.flush()?;
    Ok(staged)
}

fn write_study_set(set: &StudySet, output: Option<&Path>) -> anyhow::Result<()> {
    let Some(dir) = output else {
        println!("{}", set.note);
        if set.diagram.is_some() {
            eprintln!("(concept map available; pass --output to save it)");
        }
        if !set.quiz.is_empty() {
            eprintln!("(quiz available; pass --output to save it)");
        }
        return Ok(());
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let mut written: Vec<PathBuf> = Vec::new();

    let note_path = dir.join("note.md");
    std::fs::write(&note_path, &set.note)
        .with_context(|| format!("Failed to write {}", note_path.display()))?;
    written.push(note_path);

    if let Some(diagram) = &set.diagram {
        let path = dir.join("concept-map.dot");
        std::fs::write(&path, diagram)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    if !set.quiz.is_empty() {
        let path = dir.join("quiz.md");
        std::fs::write(&path, &set.quiz)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// One actionable line (or block) per failure kind, on stderr.
async fn print_remedy(err: &PipelineError, service: &dyn LectureService) {
    match err {
        PipelineError::ModelNotFound { model } => {
            eprintln!("Model '{model}' was not found.");
            match service.list_models().await {
                Ok(names) if !names.is_empty() => {
                    eprintln!("Models this service advertises:");
                    for name in names.iter().take(10) {
                        eprintln!("  {name}");
                    }
                }
                _ => eprintln!("Run `scribe models` to list what this service advertises."),
            }
        }
        PipelineError::ServerBusy { attempts } => {
            eprintln!(
                "The service stayed rate limited through {attempts} attempts. \
                 Wait a few minutes and retry, or switch to a less busy model."
            );
        }
        PipelineError::ProcessingTimeout { polls, waited } => {
            eprintln!(
                "The recording was still processing after {polls} checks ({}s). \
                 Try a shorter recording, or raise max_polls under [polling].",
                waited.as_secs()
            );
        }
        PipelineError::ProcessingFailed => {
            eprintln!(
                "The service could not process this recording. \
                 Check that the file is valid audio in a supported format."
            );
        }
        PipelineError::EmptyCompletion => {
            eprintln!("The model returned an empty completion. Re-running usually helps.");
        }
        _ => {}
    }
}
