//! Context assembly: bounding the material shown to the generator.
//!
//! This is a bounding step, not a ranking step. Chunks are taken in
//! storage order, capped by count, joined, and cut to a character budget
//! so the prompt stays within the generator's input limits.
//!
//! # Algorithm
//!
//! 1. Take the first `max_chunks` chunks.
//! 2. Join them with [`SNIPPET_SEPARATOR`].
//! 3. Truncate the join to `max_chars` characters (Unicode scalar values,
//!    never splitting a character); the last kept snippet may be partial.
//!
//! # Example
//!
//! ```rust
//! use study_coach_core::context::{assemble, ContextLimits};
//!
//! let chunks = vec!["Photosynthesis converts light.".to_string()];
//! let files = vec!["bio.pdf".to_string()];
//! let ctx = assemble(&chunks, &files, ContextLimits::default());
//! assert_eq!(ctx.material_summary, "Study material from bio.pdf (1 sections)");
//! ```

use crate::models::AssembledContext;

/// Maximum number of chunks shown to the generator by default.
pub const DEFAULT_MAX_CHUNKS: usize = 15;

/// Maximum characters of joined chunk text shown by default.
pub const DEFAULT_MAX_CHARS: usize = 5000;

pub const SNIPPET_SEPARATOR: &str = "\n";

/// Bounds applied by [`assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub max_chunks: usize,
    pub max_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Select and bound the chunks visible to a single generation request.
///
/// # Guarantees
///
/// - `ctx.text().chars().count() <= limits.max_chars`.
/// - At most `limits.max_chunks` snippets, in input order.
/// - `total_chunks` and the summary count every input chunk, not just the
///   ones that survived bounding.
pub fn assemble(chunks: &[String], filenames: &[String], limits: ContextLimits) -> AssembledContext {
    let separator_len = SNIPPET_SEPARATOR.chars().count();
    let mut snippets: Vec<String> = Vec::new();
    let mut used = 0usize;

    for chunk in chunks.iter().take(limits.max_chunks) {
        let sep = if snippets.is_empty() { 0 } else { separator_len };
        if used + sep >= limits.max_chars {
            break;
        }
        used += sep;

        let remaining = limits.max_chars - used;
        let snippet: String = chunk.chars().take(remaining).collect();
        used += snippet.chars().count();
        snippets.push(snippet);

        if used >= limits.max_chars {
            break;
        }
    }

    AssembledContext {
        snippets,
        material_summary: format!(
            "Study material from {} ({} sections)",
            filenames.join(", "),
            chunks.len()
        ),
        source_filenames: filenames.to_vec(),
        total_chunks: chunks.len(),
    }
}
