//! JSON-file [`MaterialStore`] backend.
//!
//! Reads the collection written by the ingestion process
//! (`{ "vectors": [...], "docs": { ... } }`) from disk on every call. There
//! is no cache: each request observes the most recently ingested state.
//!
//! A missing file means nothing has been uploaded yet and loads as an
//! empty collection. A file that exists but cannot be read or parsed is an
//! error, which [`fetch_owned_chunks`](study_coach_core::store::fetch_owned_chunks)
//! logs and treats as empty.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use study_coach_core::models::MaterialStoreState;
use study_coach_core::store::MaterialStore;

pub struct JsonMaterialStore {
    path: PathBuf,
}

impl JsonMaterialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MaterialStore for JsonMaterialStore {
    async fn load(&self) -> Result<MaterialStoreState> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "material store not found; no material yet");
                return Ok(MaterialStoreState::default());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read material store: {}", self.path.display())
                })
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse material store: {}", self.path.display()))
    }
}
