//! Loaded, read-only index set and the long-lived [`Explorer`] that owns it.

use crate::ancestors::AncestorIndex;
use crate::chunks::ChunkStore;
use crate::graph::TransitionGraph;
use crate::model::{ChunkManifest, OpeningEntry, PlayerPair};
use crate::position::position_key;
use crate::store::{
    require_json, BlobStore, StoreError, ANCESTORS_KEY, ECO_KEY, MANIFEST_KEY, OPENINGS_KEY,
    PLAYERS_KEY, TRANSITIONS_KEY,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Every query-side index, plus the lookups derived from the name index.
#[derive(Debug)]
pub struct Indexes {
    pub manifest: ChunkManifest,
    pub openings: BTreeMap<String, OpeningEntry>,
    pub eco: BTreeMap<String, Vec<u64>>,
    pub players: Vec<PlayerPair>,
    pub ancestors: AncestorIndex,
    pub graph: TransitionGraph,
    /// FEN -> opening names. Inverted from `openings`, never persisted.
    by_fen: HashMap<String, Vec<String>>,
    /// Position key -> indexed FENs sharing it, sorted.
    by_position: HashMap<String, Vec<String>>,
}

impl Indexes {
    pub fn new(
        manifest: ChunkManifest,
        openings: BTreeMap<String, OpeningEntry>,
        eco: BTreeMap<String, Vec<u64>>,
        players: Vec<PlayerPair>,
        ancestors: AncestorIndex,
        graph: TransitionGraph,
    ) -> Self {
        let mut by_fen: HashMap<String, Vec<String>> = HashMap::new();
        for (name, entry) in &openings {
            if entry.game_ids.is_empty() {
                continue;
            }
            by_fen
                .entry(entry.fen.clone())
                .or_default()
                .push(name.clone());
        }

        let mut by_position: HashMap<String, Vec<String>> = HashMap::new();
        for fen in by_fen.keys() {
            by_position
                .entry(position_key(fen).to_string())
                .or_default()
                .push(fen.clone());
        }
        by_position.values_mut().for_each(|fens| fens.sort());

        let gaps = players.iter().filter(|p| p.is_placeholder()).count();
        if gaps > 0 {
            tracing::warn!(gaps, "Players index contains placeholder entries");
        }

        Self {
            manifest,
            openings,
            eco,
            players,
            ancestors,
            graph,
            by_fen,
            by_position,
        }
    }

    /// Fetch every artifact from `store` concurrently.
    pub async fn load<S: BlobStore>(store: &S) -> Result<Self, StoreError> {
        let (manifest, openings, eco, players, ancestors, graph) = tokio::try_join!(
            require_json::<S, ChunkManifest>(store, MANIFEST_KEY),
            require_json::<S, BTreeMap<String, OpeningEntry>>(store, OPENINGS_KEY),
            require_json::<S, BTreeMap<String, Vec<u64>>>(store, ECO_KEY),
            require_json::<S, Vec<PlayerPair>>(store, PLAYERS_KEY),
            require_json::<S, AncestorIndex>(store, ANCESTORS_KEY),
            require_json::<S, TransitionGraph>(store, TRANSITIONS_KEY),
        )?;

        tracing::info!(
            games = manifest.total_games,
            chunks = manifest.chunks.len(),
            openings = openings.len(),
            eco_codes = eco.len(),
            ancestors = ancestors.len(),
            positions = graph.len(),
            "Loaded indexes"
        );
        Ok(Self::new(manifest, openings, eco, players, ancestors, graph))
    }

    /// Openings whose canonical FEN is exactly `fen`.
    pub fn openings_at<'a>(
        &'a self,
        fen: &str,
    ) -> impl Iterator<Item = (&'a str, &'a OpeningEntry)> + 'a {
        self.by_fen
            .get(fen)
            .into_iter()
            .flatten()
            .filter_map(|name| {
                self.openings
                    .get(name)
                    .map(|entry| (name.as_str(), entry))
            })
    }

    /// Indexed FENs whose position key is `position`.
    pub fn fens_at_position(&self, position: &str) -> &[String] {
        self.by_position
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Descendant FENs recorded for an unindexed position.
    pub fn descendants(&self, position: &str) -> &[String] {
        self.ancestors
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Player pair of a game, or `None` for unknown ids and padded gaps.
    pub fn players_of(&self, game_id: u64) -> Option<&PlayerPair> {
        usize::try_from(game_id)
            .ok()
            .and_then(|i| self.players.get(i))
            .filter(|pair| !pair.is_placeholder())
    }
}

/// Long-lived handle constructed once per process and shared by reference.
///
/// Indexes are loaded on first use and then treated as immutable; the chunk
/// store caches chunks as they are read.
pub struct Explorer<S> {
    store: Arc<S>,
    indexes: OnceCell<Indexes>,
    chunks: OnceCell<ChunkStore<S>>,
}

impl<S: BlobStore> Explorer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            indexes: OnceCell::new(),
            chunks: OnceCell::new(),
        }
    }

    pub async fn indexes(&self) -> Result<&Indexes, StoreError> {
        self.indexes
            .get_or_try_init(|| Indexes::load(self.store.as_ref()))
            .await
    }

    /// Chunk store sized from the manifest. Loads the indexes if needed.
    pub async fn chunks(&self) -> Result<&ChunkStore<S>, StoreError> {
        let chunk_size = self.indexes().await?.manifest.chunk_size;
        Ok(self
            .chunks
            .get_or_init(|| async { ChunkStore::new(self.store.clone(), chunk_size) })
            .await)
    }
}
