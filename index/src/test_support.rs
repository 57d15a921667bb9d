//! Shared fixtures: a small master-game corpus and its transition graph.

use crate::builder::{build_indexes, BuildConfig};
use crate::graph::TransitionGraph;
use crate::indexes::Explorer;
use crate::model::{Classification, CorpusGame, CorpusGameFields};
use crate::store::MemoryBlobStore;
use std::sync::Arc;

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
pub const AFTER_D4: &str = "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1";
pub const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
pub const AFTER_E4_C5: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2";
pub const AFTER_NF3: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";
pub const AFTER_NC6: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
pub const RUY_LOPEZ: &str = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";

pub fn classification(name: &str, eco: &str, fen: &str) -> Classification {
    Classification {
        name: name.to_string(),
        eco: eco.to_string(),
        fen: fen.to_string(),
    }
}

pub fn game(white: &str, black: &str, result: &str, moves: &str) -> CorpusGameFields {
    CorpusGameFields {
        white: white.to_string(),
        black: black.to_string(),
        white_elo: Some(2750),
        black_elo: Some(2750),
        white_title: Some("GM".to_string()),
        black_title: Some("GM".to_string()),
        result: result.to_string(),
        date: Some("2024.01.01".to_string()),
        event: Some("Fixture Open".to_string()),
        moves: moves.to_string(),
        ply_count: moves.split_whitespace().filter(|t| !t.ends_with('.')).count() as u32,
        eco: None,
        source: Some("fixture".to_string()),
    }
}

pub fn corpus_game(fields: CorpusGameFields, cls: Option<Classification>) -> CorpusGame {
    CorpusGame {
        index: None,
        game: fields,
        classification: cls,
    }
}

/// Eleven games, indices 0..=10.
///
/// - 0..=2 stop at 1.e4 (King's Pawn Game): white Carlsen, Carlsen, Ding; black Caruana
/// - 3..=4 Open Game (1.e4 e5)
/// - 5 King's Knight Opening (1.e4 e5 2.Nf3)
/// - 6..=7 Sicilian Defense (1.e4 c5)
/// - 8 Queen's Pawn Game (1.d4) with a diverging header ECO
/// - 9 unclassified
/// - 10 Ruy Lopez, reached through the unindexed 2...Nc6 position
pub fn fixture_corpus() -> Vec<CorpusGame> {
    let kp = || classification("King's Pawn Game", "B00", AFTER_E4);
    let open = || classification("Open Game", "C20", AFTER_E4_E5);
    let sicilian = || classification("Sicilian Defense", "B20", AFTER_E4_C5);

    let mut g8 = game("Nakamura, Hikaru", "So, Wesley", "1/2-1/2", "1. d4 d5 2. c4");
    g8.eco = Some("A40".to_string());
    let mut g9 = game("Firouzja, Alireza", "Giri, Anish", "0-1", "1. g4 d5");
    g9.eco = Some("A00".to_string());

    let with_eco = |mut fields: CorpusGameFields, eco: &str| {
        fields.eco = Some(eco.to_string());
        fields
    };

    vec![
        corpus_game(
            with_eco(game("Carlsen, Magnus", "Caruana, Fabiano", "1-0", "1. e4 d6 2. d4"), "B00"),
            Some(kp()),
        ),
        corpus_game(
            with_eco(game("Carlsen, Magnus", "Caruana, Fabiano", "1/2-1/2", "1. e4 g6"), "B00"),
            Some(kp()),
        ),
        corpus_game(
            with_eco(game("Ding, Liren", "Caruana, Fabiano", "0-1", "1. e4 b6"), "B00"),
            Some(kp()),
        ),
        corpus_game(
            with_eco(game("Carlsen, Magnus", "Ding, Liren", "1-0", "1. e4 e5 2. Bc4"), "C20"),
            Some(open()),
        ),
        corpus_game(
            with_eco(game("Ding, Liren", "Carlsen, Magnus", "1-0", "1. e4 e5 2. Nc3"), "C20"),
            Some(open()),
        ),
        corpus_game(
            with_eco(game("Caruana, Fabiano", "Ding, Liren", "1/2-1/2", "1. e4 e5 2. Nf3 d6"), "C40"),
            Some(classification("King's Knight Opening", "C40", AFTER_NF3)),
        ),
        corpus_game(
            with_eco(game("Nepomniachtchi, Ian", "Ding, Liren", "1-0", "1. e4 c5 2. Nc3"), "B20"),
            Some(sicilian()),
        ),
        corpus_game(
            with_eco(game("Carlsen, Magnus", "Nepomniachtchi, Ian", "0-1", "1. e4 c5 2. c3"), "B20"),
            Some(sicilian()),
        ),
        corpus_game(g8, Some(classification("Queen's Pawn Game", "D00", AFTER_D4))),
        corpus_game(g9, None),
        corpus_game(
            with_eco(
                game("So, Wesley", "Carlsen, Magnus", "1-0", "1. e4 e5 2. Nf3 Nc6 3. Bb5"),
                "C60",
            ),
            Some(classification("Ruy Lopez", "C60", RUY_LOPEZ)),
        ),
    ]
}

pub fn fixture_graph() -> TransitionGraph {
    TransitionGraph::from_edges([
        (START, AFTER_E4),
        (START, AFTER_D4),
        (AFTER_E4, AFTER_E4_E5),
        (AFTER_E4, AFTER_E4_C5),
        (AFTER_E4_E5, AFTER_NF3),
        (AFTER_NF3, AFTER_NC6),
        (AFTER_NC6, RUY_LOPEZ),
    ])
}

pub fn corpus_jsonl(games: &[CorpusGame]) -> String {
    games
        .iter()
        .map(|g| serde_json::to_string(g).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the fixture corpus into a fresh in-memory store with a small chunk
/// size so queries span several chunks.
pub async fn built_store() -> Arc<MemoryBlobStore> {
    let store = Arc::new(MemoryBlobStore::new());
    let jsonl = corpus_jsonl(&fixture_corpus());
    build_indexes(
        store.as_ref(),
        jsonl.as_bytes(),
        &fixture_graph(),
        &BuildConfig { chunk_size: 4 },
    )
    .await
    .unwrap();
    store
}

pub async fn fixture_explorer() -> Explorer<MemoryBlobStore> {
    Explorer::new(built_store().await)
}
