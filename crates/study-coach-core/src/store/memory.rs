//! In-memory [`MaterialStore`] implementation for tests and embedding.
//!
//! Holds a [`MaterialStoreState`] behind `std::sync::RwLock`; `load`
//! returns a snapshot clone, matching the re-read-per-call semantics of
//! the file-backed store.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{chunk_key, DocumentChunk, MaterialStoreState};

use super::MaterialStore;

/// In-memory material store.
pub struct InMemoryMaterialStore {
    state: RwLock<MaterialStoreState>,
}

impl InMemoryMaterialStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MaterialStoreState::default()),
        }
    }

    /// Append a chunk under `<owner_id>::<discriminator>` and return its key.
    ///
    /// Fails if `owner_id` is empty or contains the key separator.
    pub fn insert(
        &self,
        owner_id: &str,
        discriminator: &str,
        filename: &str,
        text: &str,
    ) -> Result<String> {
        let Some(key) = chunk_key(owner_id, discriminator) else {
            bail!("invalid owner id for chunk key: {owner_id:?}");
        };
        let mut state = self.state.write().unwrap();
        state.docs.retain(|d| d.chunk_key != key);
        state.docs.push(DocumentChunk {
            owner_id: owner_id.to_string(),
            chunk_key: key.clone(),
            filename: filename.to_string(),
            text: text.to_string(),
        });
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMaterialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MaterialStoreState> for InMemoryMaterialStore {
    fn from(state: MaterialStoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl MaterialStore for InMemoryMaterialStore {
    async fn load(&self) -> Result<MaterialStoreState> {
        Ok(self.state.read().unwrap().clone())
    }
}
