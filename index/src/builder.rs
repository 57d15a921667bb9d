//! Offline index build.
//!
//! Turns a JSON Lines corpus of classified games into the persisted artifacts
//! the query side reads. Outputs are produced in dependency order:
//!
//! 1. chunks and the chunk manifest
//! 2. the name index (position lookups are derived from it at load time)
//! 3. the header ECO code index
//! 4. the game-to-players array
//! 5. the ancestor index, from the transition graph and the name index
//!
//! Any failure aborts the build.

use crate::ancestors::build_ancestor_index;
use crate::graph::TransitionGraph;
use crate::model::{
    Chunk, ChunkManifest, ChunkRange, Classification, CorpusGame, OpeningEntry, PlayerPair,
    DEFAULT_CHUNK_SIZE,
};
use crate::position::position_key;
use crate::store::{
    self, chunk_key, BlobStore, StoreError, ANCESTORS_KEY, ECO_KEY, MANIFEST_KEY, OPENINGS_KEY,
    PLAYERS_KEY, TRANSITIONS_KEY,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error reading corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus line {line}: {source}")]
    Corpus {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("game index {index} does not follow previous index {previous}")]
    NonMonotonicIndex { previous: u64, index: u64 },
    #[error("game index {index} is more than {max_gap} past the next free index {next}")]
    IndexOutOfRange { next: u64, index: u64, max_gap: u64 },
    #[error("chunk size must be positive")]
    InvalidChunkSize,
}

/// Largest run of missing indices a single game may skip. Gaps are padded in
/// the players array, so this bounds its growth per game.
pub const MAX_INDEX_GAP: u64 = 1 << 20;

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub chunk_size: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub games: u64,
    pub chunks: usize,
    pub openings: usize,
    pub eco_codes: usize,
    pub unclassified: u64,
    pub collisions: u64,
    /// Sequence indices skipped between consecutive games.
    pub gaps: u64,
    pub ancestor_entries: usize,
}

/// In-memory outputs of [`IndexBuilder::finish`].
#[derive(Debug, Clone)]
pub struct BuiltIndexes {
    pub last_chunk: Option<Chunk>,
    pub manifest: ChunkManifest,
    pub openings: BTreeMap<String, OpeningEntry>,
    pub eco: BTreeMap<String, Vec<u64>>,
    pub players: Vec<PlayerPair>,
    pub report: BuildReport,
}

/// Streaming builder. Feed games in ingestion order with [`ingest`]; each
/// call may hand back a completed chunk for the caller to persist.
///
/// [`ingest`]: IndexBuilder::ingest
pub struct IndexBuilder {
    chunk_size: u64,
    next_index: u64,
    last_index: Option<u64>,
    current: Option<Chunk>,
    ranges: Vec<ChunkRange>,
    openings: BTreeMap<String, OpeningEntry>,
    fen_owner: HashMap<String, String>,
    eco: BTreeMap<String, Vec<u64>>,
    players: Vec<PlayerPair>,
    report: BuildReport,
}

impl IndexBuilder {
    pub fn new(config: &BuildConfig) -> Result<Self, BuildError> {
        if config.chunk_size == 0 {
            return Err(BuildError::InvalidChunkSize);
        }
        Ok(Self {
            chunk_size: config.chunk_size,
            next_index: 0,
            last_index: None,
            current: None,
            ranges: Vec::new(),
            openings: BTreeMap::new(),
            fen_owner: HashMap::new(),
            eco: BTreeMap::new(),
            players: Vec::new(),
            report: BuildReport::default(),
        })
    }

    /// Add one game. Returns the previous chunk once a game lands in a new one.
    pub fn ingest(&mut self, game: CorpusGame) -> Result<Option<Chunk>, BuildError> {
        let index = game.index.unwrap_or(self.next_index);
        if let Some(previous) = self.last_index {
            if index <= previous {
                return Err(BuildError::NonMonotonicIndex { previous, index });
            }
        }
        let out_of_range = || BuildError::IndexOutOfRange {
            next: self.next_index,
            index,
            max_gap: MAX_INDEX_GAP,
        };
        if index.saturating_sub(self.next_index) > MAX_INDEX_GAP {
            return Err(out_of_range());
        }
        let (Ok(slot), Some(next_index)) = (usize::try_from(index), index.checked_add(1)) else {
            return Err(out_of_range());
        };
        if index > self.next_index {
            let skipped = index - self.next_index;
            tracing::warn!(
                from = self.next_index,
                to = index,
                skipped,
                "Gap in game sequence indices, padding players index"
            );
            self.report.gaps += skipped;
        }

        let record = game.game.into_record(index);

        // Positional array: pad up to `index` so lookups stay O(1).
        self.players.resize(slot, PlayerPair::default());
        self.players.push(PlayerPair {
            white: record.white.clone(),
            black: record.black.clone(),
        });

        if let Some(code) = record.eco.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            self.eco.entry(code.to_string()).or_default().push(index);
        }

        match game.classification {
            Some(cls) if !cls.name.trim().is_empty() && !position_key(&cls.fen).is_empty() => {
                self.add_to_opening(cls, index);
            }
            Some(cls) => {
                tracing::warn!(index, name = %cls.name, fen = %cls.fen, "Ignoring malformed classification");
                self.report.unclassified += 1;
            }
            None => self.report.unclassified += 1,
        }

        let chunk_id = index / self.chunk_size;
        let rolls_over = self
            .current
            .as_ref()
            .is_some_and(|chunk| chunk.id != chunk_id);
        let completed = if rolls_over { self.close_current() } else { None };
        let chunk_size = self.chunk_size;
        self.current
            .get_or_insert_with(|| Chunk {
                id: chunk_id,
                start: chunk_id * chunk_size,
                end: (chunk_id + 1) * chunk_size,
                games: Vec::new(),
            })
            .games
            .push(record);

        self.report.games += 1;
        self.last_index = Some(index);
        self.next_index = next_index;
        Ok(completed)
    }

    /// Bind a game to its opening, enforcing one name per FEN and one FEN
    /// per name. Later conflicting classifications join the first binding.
    fn add_to_opening(&mut self, cls: Classification, index: u64) {
        let bound_fen = self.openings.get(&cls.name).map(|e| e.fen.clone());
        let owner = self.fen_owner.get(&cls.fen).cloned();
        let name = match (bound_fen, owner) {
            (Some(bound), _) => {
                if bound != cls.fen {
                    tracing::warn!(
                        name = %cls.name,
                        bound = %bound,
                        got = %cls.fen,
                        "Opening name already bound to another FEN, keeping first"
                    );
                    self.report.collisions += 1;
                }
                cls.name
            }
            (None, Some(owner)) => {
                tracing::warn!(
                    name = %cls.name,
                    owner = %owner,
                    fen = %cls.fen,
                    "FEN already owned by another opening, merging game into owner"
                );
                self.report.collisions += 1;
                owner
            }
            (None, None) => {
                self.fen_owner.insert(cls.fen.clone(), cls.name.clone());
                self.openings.insert(
                    cls.name.clone(),
                    OpeningEntry {
                        fen: cls.fen,
                        eco: cls.eco,
                        game_ids: Vec::new(),
                    },
                );
                cls.name
            }
        };
        if let Some(entry) = self.openings.get_mut(&name) {
            entry.game_ids.push(index);
        }
    }

    fn close_current(&mut self) -> Option<Chunk> {
        let chunk = self.current.take()?;
        self.ranges.push(ChunkRange {
            id: chunk.id,
            start: chunk.start,
            end: chunk.end,
            count: chunk.games.len(),
        });
        Some(chunk)
    }

    pub fn finish(mut self) -> BuiltIndexes {
        let last_chunk = self.close_current();
        self.report.chunks = self.ranges.len();
        self.report.openings = self.openings.len();
        self.report.eco_codes = self.eco.len();
        BuiltIndexes {
            last_chunk,
            manifest: ChunkManifest {
                chunk_size: self.chunk_size,
                total_games: self.report.games,
                chunks: self.ranges,
            },
            openings: self.openings,
            eco: self.eco,
            players: self.players,
            report: self.report,
        }
    }
}

/// Parse one corpus line. Blank lines yield `None`.
pub fn parse_corpus_line(line: &str, line_no: usize) -> Result<Option<CorpusGame>, BuildError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| BuildError::Corpus {
            line: line_no,
            source,
        })
}

/// Run a full build from a JSON Lines corpus into `store`.
pub async fn build_indexes<S, R>(
    store: &S,
    corpus: R,
    graph: &TransitionGraph,
    config: &BuildConfig,
) -> Result<BuildReport, BuildError>
where
    S: BlobStore,
    R: BufRead,
{
    let mut builder = IndexBuilder::new(config)?;
    tracing::info!(chunk_size = config.chunk_size, "Starting index build");

    for (i, line) in corpus.lines().enumerate() {
        let line = line?;
        let Some(game) = parse_corpus_line(&line, i + 1)? else {
            continue;
        };
        if let Some(chunk) = builder.ingest(game)? {
            write_chunk(store, &chunk).await?;
        }
    }

    let built = builder.finish();
    if let Some(chunk) = &built.last_chunk {
        write_chunk(store, chunk).await?;
    }
    store::put_json(store, MANIFEST_KEY, &built.manifest).await?;
    tracing::info!(
        chunks = built.manifest.chunks.len(),
        games = built.manifest.total_games,
        "Wrote chunks and manifest"
    );

    store::put_json(store, OPENINGS_KEY, &built.openings).await?;
    store::put_json(store, ECO_KEY, &built.eco).await?;
    store::put_json(store, PLAYERS_KEY, &built.players).await?;
    tracing::info!(
        openings = built.openings.len(),
        eco_codes = built.eco.len(),
        players = built.players.len(),
        "Wrote name, ECO and player indexes"
    );

    let ancestors = build_ancestor_index(graph, &built.openings);
    store::put_json(store, ANCESTORS_KEY, &ancestors).await?;
    store::put_json(store, TRANSITIONS_KEY, graph).await?;

    let mut report = built.report;
    report.ancestor_entries = ancestors.len();
    tracing::info!(?report, "Index build complete");
    Ok(report)
}

async fn write_chunk<S: BlobStore>(store: &S, chunk: &Chunk) -> Result<(), StoreError> {
    tracing::debug!(chunk_id = chunk.id, games = chunk.games.len(), "Writing chunk");
    store::put_json(store, &chunk_key(chunk.id), chunk).await
}
