//! Pipeline progress reporting.
//!
//! Reports the milestone sequence of a `scribe notes` run (read → upload →
//! await-ready → generate(-retry)* → partition → done) so users see where a
//! long-running request is. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;
use std::time::Duration;

/// A single pipeline milestone.
#[derive(Clone, Debug)]
pub enum PipelineEvent {
    /// Reading the input file (or stdin) into memory.
    Reading { input: String },
    /// Uploading the staged artifact to the service.
    Uploading { input: String },
    /// Waiting for server-side processing: poll n of max.
    AwaitingProcessing { poll: u32, max: u32 },
    /// Issuing generation attempt n of max against the model.
    Generating { model: String, attempt: u32, max: u32 },
    /// Rate limited; sleeping before the next attempt.
    RetryWait { attempt: u32, delay: Duration },
    /// Splitting the completion into note / concept map / quiz.
    Partitioning,
    /// Pipeline finished successfully.
    Done,
}

/// Reports pipeline progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    /// Emit a milestone. Called from the pipeline.
    fn report(&self, event: PipelineEvent);
}

/// Human-friendly progress on stderr: "notes  processing  3 / 30".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: PipelineEvent) {
        let line = match &event {
            PipelineEvent::Reading { input } => format!("notes  reading {}\n", input),
            PipelineEvent::Uploading { input } => format!("notes  uploading {}\n", input),
            PipelineEvent::AwaitingProcessing { poll, max } => {
                format!("notes  processing  {} / {}\n", poll, max)
            }
            PipelineEvent::Generating {
                model,
                attempt,
                max,
            } => format!(
                "notes  generating with {}  attempt {} / {}\n",
                model, attempt, max
            ),
            PipelineEvent::RetryWait { attempt, delay } => format!(
                "notes  rate limited on attempt {}  retrying in {:?}\n",
                attempt, delay
            ),
            PipelineEvent::Partitioning => "notes  partitioning response\n".to_string(),
            PipelineEvent::Done => "notes  done\n".to_string(),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: PipelineEvent) {
        let obj = match &event {
            PipelineEvent::Reading { input } => serde_json::json!({
                "event": "progress",
                "stage": "reading",
                "input": input
            }),
            PipelineEvent::Uploading { input } => serde_json::json!({
                "event": "progress",
                "stage": "uploading",
                "input": input
            }),
            PipelineEvent::AwaitingProcessing { poll, max } => serde_json::json!({
                "event": "progress",
                "stage": "processing",
                "poll": poll,
                "max": max
            }),
            PipelineEvent::Generating {
                model,
                attempt,
                max,
            } => serde_json::json!({
                "event": "progress",
                "stage": "generating",
                "model": model,
                "attempt": attempt,
                "max": max
            }),
            PipelineEvent::RetryWait { attempt, delay } => serde_json::json!({
                "event": "progress",
                "stage": "retry-wait",
                "attempt": attempt,
                "delay_secs": delay.as_secs()
            }),
            PipelineEvent::Partitioning => serde_json::json!({
                "event": "progress",
                "stage": "partitioning"
            }),
            PipelineEvent::Done => serde_json::json!({
                "event": "progress",
                "stage": "done"
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: PipelineEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Parse a mode name as used on the CLI.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller passes it into the pipeline.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
