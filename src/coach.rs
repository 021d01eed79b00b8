//! Builds a [`StudyCoach`] from configuration.

use std::sync::Arc;

use anyhow::Result;

use study_coach_core::generation::{DisabledGenerator, Generator};
use study_coach_core::pipeline::StudyCoach;

use crate::config::Config;
use crate::generation::create_generator;
use crate::json_store::JsonMaterialStore;

/// Coach backed by the configured JSON store and `generator`.
pub fn build_coach(config: &Config, generator: Arc<dyn Generator>) -> StudyCoach {
    let store = Arc::new(JsonMaterialStore::new(&config.store.path));
    StudyCoach::new(store, generator, config.context.limits())
}

/// Coach backed by the configured store and generation provider.
pub fn coach_from_config(config: &Config) -> Result<StudyCoach> {
    let generator = create_generator(&config.generation)?;
    tracing::debug!(
        provider = %config.generation.provider,
        model = generator.model_name(),
        store = %config.store.path.display(),
        "study coach configured"
    );
    Ok(build_coach(config, generator))
}

/// Coach that can retrieve and render prompts but never calls out.
pub fn offline_coach(config: &Config) -> StudyCoach {
    build_coach(config, Arc::new(DisabledGenerator))
}
