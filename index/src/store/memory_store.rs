use super::{BlobStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-process blob store. Counts reads so callers can observe caching.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far, hits and misses alike.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match self.blobs.read() {
            Ok(blobs) => blobs.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        keys.sort();
        keys
    }

    #[cfg(test)]
    pub fn remove(&self, key: &str) {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.remove(key);
        }
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::Io(std::io::Error::other("poisoned blob map")))?;
        Ok(blobs.get(key).cloned())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StoreError::Io(std::io::Error::other("poisoned blob map")))?;
        blobs.insert(key.to_string(), bytes);
        Ok(())
    }
}
