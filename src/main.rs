//! # Lecture Scribe CLI (`scribe`)
//!
//! The `scribe` binary turns a lecture recording into a study set:
//! structured Markdown notes, a Graphviz concept map, and a practice
//! quiz, generated in a single model pass.
//!
//! ## Usage
//!
//! ```bash
//! scribe --config ./scribe.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scribe notes <AUDIO>` | Generate a study set from a recording (`-` for stdin) |
//! | `scribe models` | List the models the configured service advertises |
//! | `scribe init` | Write a starter `scribe.toml` |
//!
//! ## Examples
//!
//! ```bash
//! # Write a starter config, then add your API key
//! scribe init
//!
//! # Notes on stdout
//! scribe notes lecture.mp3
//!
//! # Full study set on disk, exam-prep flavored
//! scribe notes lecture.mp3 --style exam --output study/
//!
//! # Pick a model for one run
//! scribe notes lecture.mp3 --model gemini-2.0-flash-exp
//!
//! # Machine-readable progress for wrappers
//! scribe notes lecture.mp3 --progress json -o study/
//! ```

mod config;
mod gemini;
mod generate;
mod partition;
mod pipeline;
mod progress;
mod prompt;
mod service;
mod upload;

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lecture Scribe CLI — study notes, concept maps, and quizzes from
/// recorded lectures.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/scribe.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "scribe",
    about = "Lecture Scribe — study notes, concept maps, and quizzes from recorded lectures",
    version,
    long_about = "Lecture Scribe uploads a lecture recording to a Gemini model, waits for \
    server-side processing, and asks for structured notes, a Graphviz concept map, and a \
    practice quiz in one completion, which it splits into separate artifacts."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./scribe.toml` when that file exists; built-in defaults
    /// apply otherwise. A path given explicitly must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress reporting: `off`, `human`, or `json`.
    ///
    /// Defaults to `human` when stderr is a terminal, `off` otherwise.
    #[arg(long, global = true)]
    progress: Option<String>,

    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Generate a study set from a lecture recording.
    ///
    /// Uploads the recording, waits for the service to finish processing
    /// it, asks the model for notes, a concept map, and a quiz in one
    /// completion, and splits that completion into the three artifacts.
    /// Without `--output` the notes print to stdout.
    Notes {
        /// Path to the recording, or `-` to read it from stdin.
        audio: PathBuf,

        /// Model for this run (overrides `[generation] model`).
        #[arg(long)]
        model: Option<String>,

        /// Note style: `general`, `academic`, or `exam`
        /// (overrides `[generation] style`).
        #[arg(long)]
        style: Option<String>,

        /// Directory for `note.md`, `concept-map.dot`, and `quiz.md`.
        /// Created if missing; absent sections write no file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the models the configured service advertises.
    Models,

    /// Write a starter `scribe.toml` to the current directory.
    ///
    /// The template documents every setting with its default. Refuses to
    /// overwrite an existing file unless `--force` is given.
    Init {
        /// Overwrite an existing `scribe.toml`.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't require config
    if let Commands::Init { force } = &cli.command {
        config::scaffold_config(*force)?;
        return Ok(());
    }

    let mut cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Notes {
            audio,
            model,
            style,
            output,
        } => {
            if let Some(model) = model {
                cfg.generation.model = model;
            }
            if let Some(style) = style {
                if prompt::NoteStyle::from_name(&style).is_none() {
                    bail!(
                        "Unknown note style: '{}'. Must be general, academic, or exam.",
                        style
                    );
                }
                cfg.generation.style = style;
            }
            let mode = match cli.progress.as_deref() {
                Some(name) => match progress::ProgressMode::from_name(name) {
                    Some(mode) => mode,
                    None => bail!(
                        "Unknown progress mode: '{}'. Must be off, human, or json.",
                        name
                    ),
                },
                None => progress::ProgressMode::default_for_tty(),
            };
            pipeline::run_notes(&cfg, &audio, output.as_deref(), mode).await?;
        }
        Commands::Models => {
            gemini::run_models(&cfg).await?;
        }
        Commands::Init { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
