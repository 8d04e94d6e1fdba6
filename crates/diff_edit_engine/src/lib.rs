//! Pure snippet-substitution engine for exact-match textual edits.
//!
//! The engine owns occurrence semantics only: counting, leftmost
//! replacement, and the explicit ambiguity and no-op outcomes. Reading and
//! writing file content, path handling, and transcript bookkeeping belong
//! to the caller.
//!
//! Occurrence policy:
//! - 0 occurrences: the edit fails with [`EditError::SnippetNotFound`] and
//!   the caller must not write.
//! - 2+ occurrences: the edit proceeds against the leftmost occurrence and
//!   the outcome reports the count so the caller can warn. Occurrences are
//!   counted non-overlapping, left to right.
//! - Replacement text equal to the original content: [`EditOutcome::NoChange`],
//!   and the caller must skip the write.

use similar::TextDiff;
use thiserror::Error;

/// Maximum number of diff lines included in a rendered preview.
const PREVIEW_MAX_LINES: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("original snippet must not be empty")]
    EmptyOriginalSnippet,

    #[error("original snippet not found; expected (verbatim):\n{expected}")]
    SnippetNotFound { expected: String },
}

/// Result of applying one snippet edit to in-memory content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The content changed. `occurrences` is the total match count; when it
    /// exceeds one, only the leftmost occurrence was replaced.
    Applied {
        content: String,
        occurrences: usize,
    },
    /// The replacement produced byte-identical content; nothing to persist.
    NoChange { occurrences: usize },
}

/// Applies one exact-match snippet substitution to `content`.
pub fn apply_snippet_edit(
    content: &str,
    original: &str,
    replacement: &str,
) -> Result<EditOutcome, EditError> {
    if original.is_empty() {
        return Err(EditError::EmptyOriginalSnippet);
    }

    let occurrences = content.match_indices(original).count();
    if occurrences == 0 {
        return Err(EditError::SnippetNotFound {
            expected: original.to_string(),
        });
    }

    let updated = content.replacen(original, replacement, 1);
    if updated == content {
        return Ok(EditOutcome::NoChange { occurrences });
    }

    Ok(EditOutcome::Applied {
        content: updated,
        occurrences,
    })
}

/// Renders a compact unified diff between two content revisions.
///
/// Output is capped at [`PREVIEW_MAX_LINES`] lines; longer diffs end with a
/// truncation marker.
#[must_use]
pub fn unified_preview(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let rendered = diff
        .unified_diff()
        .context_radius(2)
        .to_string();

    let mut lines: Vec<&str> = rendered.lines().collect();
    if lines.len() > PREVIEW_MAX_LINES {
        lines.truncate(PREVIEW_MAX_LINES);
        let mut truncated = lines.join("\n");
        truncated.push_str("\n[preview truncated]");
        return truncated;
    }

    rendered.trim_end().to_string()
}
