//! Material store abstraction.
//!
//! The [`MaterialStore`] trait loads the persisted chunk collection; the
//! free function [`fetch_owned_chunks`] applies ownership scoping on top.
//! Implementations are expected to re-read their backing storage on every
//! call so a request always observes the latest ingested state.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{MaterialStoreState, OwnedMaterial};

/// Read-only access to the persisted material collection.
///
/// Return `Ok` with an empty state when the backing storage simply does
/// not exist yet; reserve `Err` for storage that exists but cannot be read.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    /// Load the full collection.
    async fn load(&self) -> Result<MaterialStoreState>;
}

/// Fetch the chunk texts and filenames owned by `owner_id`.
///
/// Never fails: an unreadable store is logged and treated as holding no
/// material, which callers already handle as "nothing uploaded yet".
pub async fn fetch_owned_chunks(store: &dyn MaterialStore, owner_id: &str) -> OwnedMaterial {
    match store.load().await {
        Ok(state) => state.owned_by(owner_id),
        Err(e) => {
            tracing::warn!(owner_id, error = %e, "material store unreadable; treating as empty");
            OwnedMaterial::default()
        }
    }
}
