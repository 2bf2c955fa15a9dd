//! # Lecture Scribe
//!
//! Turns a recorded lecture into a study set: structured Markdown notes, a
//! Graphviz concept map, and a practice quiz, generated in one pass by a
//! Gemini model.
//!
//! The pipeline stages a private copy of the recording, uploads it, polls
//! until server-side processing finishes, requests all three sections as a
//! single completion, and partitions that completion on a separator token.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Recording │──▶│ Upload + poll │──▶│ Generate     │──▶│ Partition   │
//! │  (audio)  │   │  until ready  │   │ (with retry) │   │ 3 sections  │
//! └───────────┘   └───────────────┘   └──────────────┘   └──────┬──────┘
//!                                                               │
//!                                          note.md   concept-map.dot   quiz.md
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! scribe init                         # write a starter scribe.toml
//! scribe models                       # list models the service advertises
//! scribe notes lecture.mp3            # print notes to stdout
//! scribe notes lecture.mp3 -o study/  # write note.md, concept-map.dot, quiz.md
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and validation |
//! | [`service`] | Typed contract with the inference service |
//! | [`gemini`] | Gemini REST adapter |
//! | [`upload`] | Upload-and-poll until media is ready |
//! | [`generate`] | Generation with bounded retry |
//! | [`partition`] | Splitting a completion into note, diagram, quiz |
//! | [`prompt`] | Prompt assembly per note style |
//! | [`pipeline`] | End-to-end orchestration |
//! | [`progress`] | Progress reporting on stderr |

pub mod config;
pub mod gemini;
pub mod generate;
pub mod partition;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod service;
pub mod upload;
