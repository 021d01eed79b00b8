//! Generator abstraction.
//!
//! The hosted text-generation service is an untrusted, non-deterministic
//! collaborator. The pipeline only sees it through [`Generator`], so it
//! can be swapped for a deterministic double in tests.
//!
//! Concrete HTTP clients live in the `study-coach` app crate.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ServiceError;

/// Turns a prompt into raw generated text.
///
/// Implementations must not retry and must not substitute empty or
/// default text on failure; retry policy belongs to the caller.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Send `prompt` as a single user message and return the first
    /// completion.
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// A generator that always fails with [`ServiceError::Disabled`].
///
/// Used when no provider is configured and for dry runs that must never
/// reach the network.
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Disabled)
    }
}

/// A deterministic generator that answers every prompt with the same text
/// and counts how often it was called.
pub struct CannedGenerator {
    response: String,
    calls: AtomicUsize,
}

impl CannedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    fn model_name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
