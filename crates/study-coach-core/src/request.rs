//! Inbound plan request validation.
//!
//! Requests arrive as loosely-typed JSON (`availableTime` may be a number
//! or a string). [`RawPlanRequest`] accepts whatever the caller sent and
//! [`RawPlanRequest::validate`] turns it into a [`StudyPlanRequest`] or an
//! [`CoachError::InvalidRequest`] before any retrieval happens.

use serde::Deserialize;
use serde_json::Value;

use crate::error::CoachError;
use crate::lenient;
use crate::models::{StudyPlanRequest, KEY_SEPARATOR};

/// Smallest time budget a plan can be built for.
pub const MIN_AVAILABLE_MINUTES: i64 = 10;

/// A plan request as received, before coercion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlanRequest {
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "availableTime")]
    pub available_time_minutes: Option<Value>,
}

impl RawPlanRequest {
    pub fn new(owner_id: impl Into<String>, available_time_minutes: i64) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            available_time_minutes: Some(Value::from(available_time_minutes)),
        }
    }

    pub fn validate(&self) -> Result<StudyPlanRequest, CoachError> {
        let owner_id = self
            .owner_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoachError::InvalidRequest("userId is required".to_string()))?;

        // Ownership is an exact key-prefix match; never normalize the id.
        if owner_id.trim() != owner_id {
            return Err(CoachError::InvalidRequest(
                "userId must not begin or end with whitespace".to_string(),
            ));
        }

        if owner_id.contains(KEY_SEPARATOR) {
            return Err(CoachError::InvalidRequest(format!(
                "userId must not contain {KEY_SEPARATOR:?}"
            )));
        }

        let minutes = self
            .available_time_minutes
            .as_ref()
            .and_then(lenient::coerce_int)
            .ok_or_else(|| {
                CoachError::InvalidRequest("availableTime is required (in minutes)".to_string())
            })?;

        if minutes < MIN_AVAILABLE_MINUTES {
            return Err(CoachError::InvalidRequest(format!(
                "Please provide at least {MIN_AVAILABLE_MINUTES} minutes of available study time."
            )));
        }

        let available_time_minutes = u32::try_from(minutes).map_err(|_| {
            CoachError::InvalidRequest(format!("availableTime is too large: {minutes}"))
        })?;

        Ok(StudyPlanRequest {
            owner_id: owner_id.to_string(),
            available_time_minutes,
        })
    }
}
