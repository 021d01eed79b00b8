//! Core data models for the plan pipeline.
//!
//! Two families of types live here: the persisted material collection
//! ([`MaterialStoreState`], [`DocumentChunk`]) written by the external
//! ingestion process, and the plan contract ([`StudyPlan`], [`StudyCycle`],
//! [`QuizItem`]) that the generator is asked to produce.
//!
//! Plan types decode tolerantly: every field defaults when absent or
//! `null`, and minute counts accept integers, floats, and numeric
//! strings. Callers should still treat plan content as best-effort.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;

/// Separator between the owner and the document-local part of a chunk key.
pub const KEY_SEPARATOR: &str = "::";

/// Build the storage key for a chunk: `<owner_id>::<discriminator>`.
///
/// Returns `None` when `owner_id` is empty or contains [`KEY_SEPARATOR`];
/// such an owner could otherwise claim another owner's prefix.
///
/// ```rust
/// use study_coach_core::models::chunk_key;
///
/// assert_eq!(chunk_key("u1", "notes.pdf#0").as_deref(), Some("u1::notes.pdf#0"));
/// assert_eq!(chunk_key("u1::x", "0"), None);
/// ```
pub fn chunk_key(owner_id: &str, discriminator: &str) -> Option<String> {
    if !is_valid_owner_id(owner_id) {
        return None;
    }
    Some(format!("{owner_id}{KEY_SEPARATOR}{discriminator}"))
}

/// Recover the owner from a chunk key (text before the first separator).
pub fn owner_of(key: &str) -> Option<&str> {
    key.split_once(KEY_SEPARATOR)
        .map(|(owner, _)| owner)
        .filter(|owner| !owner.is_empty())
}

/// An owner id is usable as a key prefix only if it is non-empty and
/// cannot contain the separator.
pub fn is_valid_owner_id(owner_id: &str) -> bool {
    !owner_id.is_empty() && !owner_id.contains(KEY_SEPARATOR)
}

/// A unit of previously ingested study material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Derived from `chunk_key`; empty when the key carries no owner.
    pub owner_id: String,
    pub chunk_key: String,
    /// Source document name, for display and provenance only.
    pub filename: String,
    pub text: String,
}

impl DocumentChunk {
    fn from_record(chunk_key: String, record: StoredRecord) -> Self {
        Self {
            owner_id: owner_of(&chunk_key).unwrap_or_default().to_string(),
            chunk_key,
            filename: record.filename,
            text: record.text,
        }
    }

    /// Whether the chunk's key is prefixed by `owner_id` plus the separator.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        is_valid_owner_id(owner_id)
            && self
                .chunk_key
                .strip_prefix(owner_id)
                .is_some_and(|rest| rest.starts_with(KEY_SEPARATOR))
    }
}

/// On-disk shape of one `docs` entry. Extra fields written by the
/// ingestion process are ignored.
#[derive(Deserialize)]
struct StoredRecord {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    text: String,
}

/// The persisted material collection:
/// `{ "vectors": [...], "docs": { "<chunkKey>": { "filename", "text", ... } } }`.
///
/// `docs` keeps the order in which entries appear in the file; that order
/// is the only "ranking" the context assembler ever sees.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialStoreState {
    /// Auxiliary index maintained by ingestion. Carried, never read.
    #[serde(default)]
    pub vectors: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "ordered_docs")]
    pub docs: Vec<DocumentChunk>,
}

impl MaterialStoreState {
    /// Select the chunks owned by `owner_id`, stripped to text and filename.
    pub fn owned_by(&self, owner_id: &str) -> OwnedMaterial {
        let mut material = OwnedMaterial::default();
        let mut seen = HashSet::new();
        for doc in self.docs.iter().filter(|d| d.is_owned_by(owner_id)) {
            material.chunks.push(doc.text.clone());
            if seen.insert(doc.filename.as_str()) {
                material.filenames.push(doc.filename.clone());
            }
        }
        material
    }
}

fn ordered_docs<'de, D>(deserializer: D) -> Result<Vec<DocumentChunk>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DocsVisitor;

    impl<'de> Visitor<'de> for DocsVisitor {
        type Value = Vec<DocumentChunk>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of chunk keys to chunk records")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut docs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, record)) = map.next_entry::<String, StoredRecord>()? {
                docs.push(DocumentChunk::from_record(key, record));
            }
            Ok(docs)
        }
    }

    deserializer.deserialize_map(DocsVisitor)
}

/// Result of ownership-scoped retrieval. Ownership metadata is stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedMaterial {
    /// Chunk texts in storage order.
    pub chunks: Vec<String>,
    /// Distinct filenames in first-seen order.
    pub filenames: Vec<String>,
}

impl OwnedMaterial {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// A validated plan request. Construct through
/// [`RawPlanRequest::validate`](crate::request::RawPlanRequest::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlanRequest {
    pub owner_id: String,
    pub available_time_minutes: u32,
}

/// The bounded material shown to the generator for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// Selected chunk texts; the last one may be truncated.
    pub snippets: Vec<String>,
    /// One-line description of the sources, e.g.
    /// `Study material from a.pdf, b.docx (12 sections)`.
    pub material_summary: String,
    pub source_filenames: Vec<String>,
    /// Number of chunks the owner had before bounding.
    pub total_chunks: usize,
}

impl AssembledContext {
    /// The snippets joined with the assembler's separator.
    pub fn text(&self) -> String {
        self.snippets.join(crate::context::SNIPPET_SEPARATOR)
    }
}

/// The generation target and the pipeline's output contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    #[serde(default, alias = "totalTime", deserialize_with = "lenient::minutes")]
    pub total_time_minutes: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_count"
    )]
    pub pomodoro_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub cycles: Vec<StudyCycle>,
    /// Short break applied between consecutive cycles.
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub break_minutes: u32,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub long_break_minutes: u32,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub summary: String,
    /// Attached by the pipeline, never taken from the generator.
    #[serde(skip_deserializing)]
    pub materials_used: Vec<String>,
    /// Attached by the pipeline, never taken from the generator.
    #[serde(skip_deserializing)]
    pub created_at: Option<DateTime<Utc>>,
}

impl StudyPlan {
    /// Minutes the plan actually allocates:
    /// `Σ(study + quiz) + break × (cycles − 1) + long break`.
    pub fn allocated_minutes(&self) -> u64 {
        let work: u64 = self
            .cycles
            .iter()
            .map(|c| u64::from(c.study_minutes) + u64::from(c.quiz_minutes))
            .sum();
        let gaps = self.cycles.len().saturating_sub(1) as u64;
        work + u64::from(self.break_minutes) * gaps + u64::from(self.long_break_minutes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyCycle {
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub cycle_number: u32,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub study_minutes: u32,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub quiz_minutes: u32,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub focus_task: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub objectives: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub quiz: Vec<QuizItem>,
}

/// A multiple-choice question. Options are expected to be labeled
/// (`"A) ..."`) and `answer_label` to name one of those labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub options: Vec<String>,
    #[serde(default, alias = "answer", deserialize_with = "lenient::null_default")]
    pub answer_label: String,
}
