//! Opening index and query engine.
//!
//! Indexes a corpus of classified chess games by the opening positions they
//! pass through and answers "which openings, games and players pass through
//! this position" queries. The crate is split into:
//! - build side: [`builder`] and [`ancestors`] turn a corpus plus a
//!   [`graph::TransitionGraph`] into read-only artifacts in a [`store::BlobStore`]
//! - read side: [`Explorer`] lazily loads those artifacts once per process and
//!   the [`query`] functions resolve positions against them
//! - [`service`]: the request boundary used by outer collaborators

pub mod ancestors;
pub mod builder;
pub mod chunks;
pub mod graph;
pub mod indexes;
pub mod model;
pub mod position;
pub mod query;
pub mod service;
pub mod store;

#[cfg(test)]
mod test_support;

pub use builder::{build_indexes, BuildConfig, BuildError, BuildReport};
pub use chunks::ChunkStore;
pub use graph::TransitionGraph;
pub use indexes::{Explorer, Indexes};
pub use model::{
    Chunk, ChunkManifest, ChunkRange, Classification, CorpusGame, GameRecord, OpeningEntry,
    PlayerPair, DEFAULT_CHUNK_SIZE,
};
pub use position::position_key;
pub use query::{QueryError, ResolveRequest, SortBy, SortOrder};
pub use service::{ErrorKind, ExplorerService, ServiceError};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore, StoreError};
