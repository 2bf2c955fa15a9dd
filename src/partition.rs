//! Splits one free-text completion into note / concept map / quiz.
//!
//! The prompt asks the model to separate sections with a literal token;
//! model output is not a guaranteed structured format, so everything here
//! is best-effort and total. Malformed input degrades, it never errors.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal token the prompt instructs the model to place between sections.
pub const SECTION_SEPARATOR: &str = "---SEPARATOR---";

/// Maximal `digraph … { … }` span: case-sensitive keyword, greedy to the
/// last closing brace in the segment.
static DIGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)digraph[^{]*\{.*\}").expect("digraph pattern compiles"));

/// The three artifacts carved out of one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySet {
    /// First segment, verbatim. Degrades to the whole completion when no
    /// separator is present.
    pub note: String,
    /// Normalized Graphviz DOT source; `None` when the segment is missing
    /// or empty after normalization, never `Some("")`.
    pub diagram: Option<String>,
    /// Third segment, verbatim; empty when absent.
    pub quiz: String,
}

/// Split `completion` on [`SECTION_SEPARATOR`] and normalize the parts.
///
/// Segment 0 becomes the note and segment 2 the quiz, both verbatim.
/// Segment 1 passes through [diagram normalization](normalize_diagram).
/// Segments past the third are ignored.
pub fn partition(completion: &str) -> StudySet {
    let segments: Vec<&str> = completion.split(SECTION_SEPARATOR).collect();

    StudySet {
        note: segments.first().copied().unwrap_or("").to_string(),
        diagram: segments.get(1).and_then(|s| normalize_diagram(s)),
        quiz: segments.get(2).copied().unwrap_or("").to_string(),
    }
}

/// Extract usable DOT source from a raw diagram segment.
///
/// Prefers the maximal `digraph … { … }` span when one is present; the
/// matched span is used exactly. Otherwise strips triple-backtick fences
/// (with or without a `dot` tag) and surrounding whitespace. Empty or
/// whitespace-only results become `None`.
pub fn normalize_diagram(segment: &str) -> Option<String> {
    if let Some(found) = DIGRAPH_RE.find(segment) {
        return Some(found.as_str().to_string());
    }

    let stripped = segment.replace("```dot", "").replace("```", "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
