//! Error taxonomy for the plan pipeline.
//!
//! [`CoachError`] is what the pipeline returns; it never escapes
//! [`StudyCoach::respond`](crate::pipeline::StudyCoach::respond), which maps
//! every variant to the outbound failure shape. Arithmetic inconsistencies
//! in an otherwise valid plan are not errors at all: they are reported as
//! [`PlanDiagnostic`](crate::validate::PlanDiagnostic)s alongside the plan.

use thiserror::Error;

/// A failed plan request.
#[derive(Debug, Error)]
pub enum CoachError {
    /// Missing or out-of-range input. No retrieval or generation happened.
    #[error("{0}")]
    InvalidRequest(String),

    /// The owner has no retrievable chunks. The generator was not called.
    #[error("No study material found. Please upload documents first before creating a study plan.")]
    NoMaterialFound { owner_id: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl CoachError {
    /// Whether the failure is the caller's to fix (as opposed to ours).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoachError::InvalidRequest(_) | CoachError::NoMaterialFound { .. }
        )
    }
}

/// The external generation service could not produce a completion.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status. `body` is kept for
    /// logs only.
    #[error("generation service returned status {status}")]
    Status { status: u16, body: String },

    #[error("generation service unreachable: {0}")]
    Transport(String),

    #[error("generation service response could not be decoded: {0}")]
    InvalidResponse(String),

    #[error("generation service returned no completion")]
    EmptyCompletion,

    #[error("generation is disabled")]
    Disabled,
}

impl ServiceError {
    /// Upstream HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Generated text did not contain a decodable plan.
///
/// Every variant carries the raw text for diagnosis. [`Display`] is a
/// fixed string per variant and never includes the raw text or the
/// decoder's message (which may quote it), so it is safe to hand to an
/// end user. Use [`FormatError::detail`] and [`FormatError::raw`] for logs.
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("no JSON object found in generated text")]
    NoObject { raw: String },

    #[error("generated JSON is malformed")]
    Malformed { message: String, raw: String },

    #[error("generated JSON does not match the study plan shape")]
    Shape { message: String, raw: String },
}

impl FormatError {
    pub fn raw(&self) -> &str {
        match self {
            FormatError::NoObject { raw }
            | FormatError::Malformed { raw, .. }
            | FormatError::Shape { raw, .. } => raw,
        }
    }

    /// Decoder message, for logs only.
    pub fn detail(&self) -> Option<&str> {
        match self {
            FormatError::NoObject { .. } => None,
            FormatError::Malformed { message, .. } | FormatError::Shape { message, .. } => {
                Some(message)
            }
        }
    }
}
