//! Blob store trait used for every persisted artifact.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` and can be fanned out on a multi-threaded
//! runtime.

use super::StoreError;
use std::future::Future;

/// Object store keyed by string path.
///
/// `get` distinguishes "not found" (`Ok(None)`) from a failed fetch (`Err`).
/// Callers treat the former as an empty result and the latter as fatal for
/// the operation in progress.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;
    fn put(&self, key: &str, bytes: Vec<u8>)
        -> impl Future<Output = Result<(), StoreError>> + Send;
}
