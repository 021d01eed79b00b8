//! Plan pipeline orchestration.
//!
//! [`StudyCoach`] wires the stages together:
//!
//! 1. Validate the request (no I/O on failure).
//! 2. Fetch the owner's chunks; none ⇒ [`CoachError::NoMaterialFound`]
//!    without touching the generator.
//! 3. Assemble bounded context and render the prompt.
//! 4. Generate, extract, validate.
//! 5. Echo the requested budget and attach `materialsUsed` / `createdAt`.
//!
//! [`StudyCoach::respond`] is the outermost boundary: every failure is
//! logged and mapped to an [`ErrorResponse`] there, so nothing propagates
//! further. The coach holds no mutable state and can be shared freely.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::context::{assemble, ContextLimits};
use crate::error::CoachError;
use crate::extract::extract;
use crate::generation::Generator;
use crate::models::{AssembledContext, StudyPlan, StudyPlanRequest};
use crate::prompt::build_prompt;
use crate::request::RawPlanRequest;
use crate::store::{fetch_owned_chunks, MaterialStore};
use crate::validate::{validate, PlanDiagnostic};

/// Message shown to the user for any server-side failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate study plan. Please try again.";

/// Successful outbound body: `{ "status": "success", "studyPlan": ..., "warnings": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub status: &'static str,
    pub study_plan: StudyPlan,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanDiagnostic>,
}

/// Failed outbound body: `{ "error": ..., "details": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&CoachError> for ErrorResponse {
    fn from(err: &CoachError) -> Self {
        if err.is_client_error() {
            ErrorResponse {
                error: err.to_string(),
                details: None,
            }
        } else {
            ErrorResponse {
                error: GENERATION_FAILED_MESSAGE.to_string(),
                details: Some(err.to_string()),
            }
        }
    }
}

/// Outcome of [`StudyCoach::respond`], classified for the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(PlanResponse),
    /// The caller must fix something (bad input, no material uploaded).
    Rejected(ErrorResponse),
    /// Generation or extraction failed on our side.
    Failed(ErrorResponse),
}

/// The prompt that would be sent for a request, with its inputs.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub request: StudyPlanRequest,
    pub context: AssembledContext,
    pub prompt: String,
}

/// The study plan pipeline.
pub struct StudyCoach {
    store: Arc<dyn MaterialStore>,
    generator: Arc<dyn Generator>,
    limits: ContextLimits,
}

impl StudyCoach {
    pub fn new(
        store: Arc<dyn MaterialStore>,
        generator: Arc<dyn Generator>,
        limits: ContextLimits,
    ) -> Self {
        Self {
            store,
            generator,
            limits,
        }
    }

    /// Run retrieval, assembly, and prompt rendering without generating.
    pub async fn prepare(&self, raw: &RawPlanRequest) -> Result<PreparedPrompt, CoachError> {
        let request = raw.validate()?;

        let material = fetch_owned_chunks(self.store.as_ref(), &request.owner_id).await;
        if material.is_empty() {
            return Err(CoachError::NoMaterialFound {
                owner_id: request.owner_id,
            });
        }

        let context = assemble(&material.chunks, &material.filenames, self.limits);
        tracing::info!(
            owner_id = %request.owner_id,
            chunks = context.total_chunks,
            snippets = context.snippets.len(),
            files = context.source_filenames.len(),
            "assembled study context"
        );

        let prompt = build_prompt(&request, &context);
        Ok(PreparedPrompt {
            request,
            context,
            prompt,
        })
    }

    /// Produce a plan for `raw`, or the first failure encountered.
    pub async fn create_plan(&self, raw: &RawPlanRequest) -> Result<PlanResponse, CoachError> {
        let PreparedPrompt {
            request,
            context,
            prompt,
        } = self.prepare(raw).await?;

        tracing::info!(
            owner_id = %request.owner_id,
            minutes = request.available_time_minutes,
            model = self.generator.model_name(),
            prompt_chars = prompt.len(),
            "requesting study plan"
        );
        let raw_text = self.generator.generate(&prompt).await?;

        let mut plan = extract(&raw_text)?;
        let warnings = validate(&plan, request.available_time_minutes);
        for w in &warnings {
            tracing::warn!(owner_id = %request.owner_id, "study plan diagnostic: {w}");
        }

        plan.total_time_minutes = request.available_time_minutes;
        plan.materials_used = context.source_filenames;
        plan.created_at = Some(Utc::now());

        tracing::info!(
            owner_id = %request.owner_id,
            cycles = plan.cycles.len(),
            warnings = warnings.len(),
            "study plan ready"
        );

        Ok(PlanResponse {
            status: "success",
            study_plan: plan,
            warnings,
        })
    }

    /// Run the pipeline and map every outcome to an outbound body.
    pub async fn respond(&self, raw: &RawPlanRequest) -> Reply {
        match self.create_plan(raw).await {
            Ok(response) => Reply::Success(response),
            Err(err) => {
                log_failure(&err);
                let body = ErrorResponse::from(&err);
                if err.is_client_error() {
                    Reply::Rejected(body)
                } else {
                    Reply::Failed(body)
                }
            }
        }
    }
}

fn log_failure(err: &CoachError) {
    match err {
        CoachError::InvalidRequest(msg) => {
            tracing::info!("rejected study plan request: {msg}");
        }
        CoachError::NoMaterialFound { owner_id } => {
            tracing::info!(%owner_id, "no study material uploaded");
        }
        CoachError::Service(e) => {
            tracing::error!(status = ?e.status(), "study plan generation failed: {e}");
        }
        CoachError::Format(e) => {
            tracing::error!(
                raw = %e.raw(),
                detail = e.detail().unwrap_or_default(),
                "could not extract study plan: {e}"
            );
        }
    }
}
