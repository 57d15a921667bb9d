mod fs_store;
mod memory_store;
mod traits;

pub use fs_store::FsBlobStore;
pub use memory_store::MemoryBlobStore;
pub use traits::BlobStore;

use serde::{de::DeserializeOwned, Serialize};

/// Key of the chunk manifest.
pub const MANIFEST_KEY: &str = "manifest.json";
/// Key of the name index.
pub const OPENINGS_KEY: &str = "openings.json";
/// Key of the header ECO code index.
pub const ECO_KEY: &str = "eco.json";
/// Key of the game-to-players array.
pub const PLAYERS_KEY: &str = "players.json";
/// Key of the ancestor-to-descendants index.
pub const ANCESTORS_KEY: &str = "ancestors.json";
/// Key of the transition graph artifact copied in at build time.
pub const TRANSITIONS_KEY: &str = "transitions.json";

/// Key of the chunk with the given id.
pub fn chunk_key(id: u64) -> String {
    format!("chunks/chunk-{:05}.json", id)
}

/// Errors from the blob store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),
    #[error("Missing artifact: {0}")]
    Missing(String),
}

/// Fetch and decode a JSON blob. `Ok(None)` when the key is absent.
pub async fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: BlobStore,
    T: DeserializeOwned,
{
    let Some(bytes) = store.get(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    Ok(Some(value))
}

/// Like [`get_json`] but an absent key is an error. Used for artifacts that
/// every built index set must contain.
pub async fn require_json<S, T>(store: &S, key: &str) -> Result<T, StoreError>
where
    S: BlobStore,
    T: DeserializeOwned,
{
    get_json(store, key)
        .await?
        .ok_or_else(|| StoreError::Missing(key.to_string()))
}

/// Encode and store a JSON blob.
pub async fn put_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: BlobStore,
    T: Serialize + Sync,
{
    let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.put(key, bytes).await
}
