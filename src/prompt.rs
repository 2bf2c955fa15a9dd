//! Note styles and the generation prompt.
//!
//! The prompt carries the whole output contract: three sections in a fixed
//! order, separated by the literal token the partitioner splits on.

use crate::partition::SECTION_SEPARATOR;

/// Register of the generated note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteStyle {
    /// Plain wording a first-time listener can follow.
    #[default]
    General,
    /// Formal register with precise terminology and definitions.
    Academic,
    /// Focused on likely exam material.
    Exam,
}

impl NoteStyle {
    /// Parse a style name as used in config and on the CLI.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "general" => Some(NoteStyle::General),
            "academic" => Some(NoteStyle::Academic),
            "exam" => Some(NoteStyle::Exam),
            _ => None,
        }
    }

    /// The canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            NoteStyle::General => "general",
            NoteStyle::Academic => "academic",
            NoteStyle::Exam => "exam",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            NoteStyle::General => {
                "clear headings and bullet points, in plain wording a \
                 first-time listener can follow"
            }
            NoteStyle::Academic => {
                "a formal register with precise terminology, definitions \
                 called out explicitly, and the lecture's own structure \
                 preserved"
            }
            NoteStyle::Exam => {
                "a revision focus: key facts, formulas, term definitions, \
                 and common pitfalls likely to be tested"
            }
        }
    }
}

/// Build the generation prompt for one lecture recording.
pub fn build_prompt(style: NoteStyle) -> String {
    format!(
        "Listen to the attached lecture recording and produce exactly three \
         sections, in this order, separated by the literal token \
         {sep} on a line of its own:\n\
         \n\
         1. Detailed lecture notes in Markdown, with {style}.\n\
         2. A concept map of the lecture's main ideas as Graphviz DOT: a \
         single digraph block, with no surrounding prose and no code \
         fences.\n\
         3. A short practice quiz: five questions covering the lecture, \
         each followed directly by its answer.\n\
         \n\
         Output nothing before the first section, nothing after the third, \
         and do not use the separator token anywhere else.",
        sep = SECTION_SEPARATOR,
        style = style.instruction(),
    )
}
