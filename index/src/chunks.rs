//! Chunked game storage on the query side.

use crate::model::{Chunk, GameRecord};
use crate::store::{self, chunk_key, BlobStore, StoreError};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-through cache over chunked game records.
///
/// Chunks are fetched on first access and kept for the lifetime of the store.
/// Population is not guarded: two concurrent misses for the same chunk both
/// fetch it and the second insert overwrites the first with equal data.
pub struct ChunkStore<S> {
    store: Arc<S>,
    chunk_size: u64,
    cache: RwLock<HashMap<u64, Arc<Chunk>>>,
}

impl<S: BlobStore> ChunkStore<S> {
    pub fn new(store: Arc<S>, chunk_size: u64) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn chunk_id(&self, game_id: u64) -> u64 {
        game_id / self.chunk_size
    }

    /// Load a chunk. `Ok(None)` when the chunk does not exist.
    pub async fn get(&self, chunk_id: u64) -> Result<Option<Arc<Chunk>>, StoreError> {
        if let Some(chunk) = self.cache.read().await.get(&chunk_id) {
            return Ok(Some(chunk.clone()));
        }

        let Some(chunk) =
            store::get_json::<S, Chunk>(self.store.as_ref(), &chunk_key(chunk_id)).await?
        else {
            tracing::debug!(chunk_id, "Chunk not found");
            return Ok(None);
        };

        tracing::debug!(chunk_id, games = chunk.games.len(), "Loaded chunk");
        let chunk = Arc::new(chunk);
        self.cache.write().await.insert(chunk_id, chunk.clone());
        Ok(Some(chunk))
    }

    /// Load one game by sequence index.
    pub async fn get_game(&self, game_id: u64) -> Result<Option<GameRecord>, StoreError> {
        let chunk = self.get(self.chunk_id(game_id)).await?;
        Ok(chunk.and_then(|c| c.find(game_id).cloned()))
    }

    /// Load many games. The distinct chunks are fetched concurrently first;
    /// any failed fetch fails the whole batch. Results line up with `game_ids`.
    pub async fn get_games(&self, game_ids: &[u64]) -> Result<Vec<Option<GameRecord>>, StoreError> {
        let mut chunk_ids: Vec<u64> = game_ids.iter().map(|&id| self.chunk_id(id)).collect();
        chunk_ids.sort_unstable();
        chunk_ids.dedup();

        let fetched = try_join_all(
            chunk_ids
                .iter()
                .map(|&id| async move { self.get(id).await.map(|chunk| (id, chunk)) }),
        )
        .await?;

        let chunks: HashMap<u64, Arc<Chunk>> = fetched
            .into_iter()
            .filter_map(|(id, chunk)| chunk.map(|c| (id, c)))
            .collect();

        Ok(game_ids
            .iter()
            .map(|&id| {
                chunks
                    .get(&self.chunk_id(id))
                    .and_then(|c| c.find(id))
                    .cloned()
            })
            .collect())
    }

    #[cfg(test)]
    pub async fn cached_chunks(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use crate::test_support::built_store;

    #[tokio::test]
    async fn test_get_caches_after_first_read() {
        let store = built_store().await;
        let chunks = ChunkStore::new(store.clone(), 4);
        let before = store.read_count();

        let first = chunks.get(1).await.unwrap().unwrap();
        let second = chunks.get(1).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.read_count(), before + 1);
        assert_eq!(chunks.cached_chunks().await, 1);
    }

    #[tokio::test]
    async fn test_get_game_scans_its_chunk() {
        let chunks = ChunkStore::new(built_store().await, 4);
        let game = chunks.get_game(6).await.unwrap().unwrap();
        assert_eq!(game.index, 6);
        assert_eq!(game.white, "Nepomniachtchi, Ian");
        assert_eq!(chunks.chunk_id(6), 1);
    }

    #[tokio::test]
    async fn test_missing_chunk_and_game_are_not_found() {
        let chunks = ChunkStore::new(built_store().await, 4);
        // Chunk 2 holds 8..=10 only.
        assert!(chunks.get_game(11).await.unwrap().is_none());
        assert!(chunks.get(99).await.unwrap().is_none());
        assert!(chunks.get_game(400).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_games_preserves_order_across_chunks() {
        let store = built_store().await;
        let chunks = ChunkStore::new(store.clone(), 4);
        let before = store.read_count();

        let games = chunks.get_games(&[9, 0, 5, 1, 42]).await.unwrap();
        let indices: Vec<Option<u64>> = games.iter().map(|g| g.as_ref().map(|g| g.index)).collect();
        assert_eq!(indices, vec![Some(9), Some(0), Some(5), Some(1), None]);
        // Chunks 0, 1, 2 and the missing chunk 10, each fetched once.
        assert_eq!(store.read_count(), before + 4);
    }

    #[tokio::test]
    async fn test_failed_fetch_fails_batch() {
        let store = built_store().await;
        store
            .put(&chunk_key(1), b"corrupt".to_vec())
            .await
            .unwrap();
        let chunks = ChunkStore::new(store, 4);

        assert!(chunks.get_games(&[0, 5]).await.is_err());
        // The healthy chunk is still readable on its own.
        assert!(chunks.get_game(0).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let chunks = ChunkStore::new(Arc::new(MemoryBlobStore::new()), 4000);
        assert!(chunks.get_games(&[]).await.unwrap().is_empty());
        assert!(chunks.get_game(0).await.unwrap().is_none());
    }
}
