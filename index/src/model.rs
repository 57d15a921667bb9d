//! Stored and ingested data shapes: game records, corpus lines, chunks and
//! the name index entries built from them.

use serde::{Deserialize, Serialize};

/// Number of game records per chunk.
pub const DEFAULT_CHUNK_SIZE: u64 = 4000;

/// Full per-game metadata, as stored in chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameRecord {
    /// Global sequence index, assigned at ingestion and never reused.
    pub index: u64,
    pub white: String,
    pub black: String,
    #[serde(default)]
    pub white_elo: Option<u32>,
    #[serde(default)]
    pub black_elo: Option<u32>,
    #[serde(default)]
    pub white_title: Option<String>,
    #[serde(default)]
    pub black_title: Option<String>,
    pub result: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    pub moves: String,
    #[serde(default)]
    pub ply_count: u32,
    /// ECO code from the source PGN header, if any.
    #[serde(default)]
    pub eco: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl GameRecord {
    /// The opponent of `player` in this game, if `player` took part.
    pub fn opponent_of(&self, player: &str) -> Option<&str> {
        if self.white == player {
            Some(&self.black)
        } else if self.black == player {
            Some(&self.white)
        } else {
            None
        }
    }

    /// Mean of the known ratings; 0 when neither side is rated.
    pub fn average_rating(&self) -> f64 {
        let rated: Vec<u32> = [self.white_elo, self.black_elo]
            .into_iter()
            .flatten()
            .collect();
        if rated.is_empty() {
            return 0.0;
        }
        rated.iter().map(|&r| r as f64).sum::<f64>() / rated.len() as f64
    }
}

/// Output of the external opening classifier for one game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub name: String,
    pub eco: String,
    pub fen: String,
}

/// One line of the build corpus: a game record plus its classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusGame {
    /// Explicit sequence index. When absent the builder assigns the next one.
    #[serde(default)]
    pub index: Option<u64>,
    #[serde(flatten)]
    pub game: CorpusGameFields,
    #[serde(default)]
    pub classification: Option<Classification>,
}

/// Game fields of a corpus line, without the sequence index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CorpusGameFields {
    pub white: String,
    pub black: String,
    #[serde(default)]
    pub white_elo: Option<u32>,
    #[serde(default)]
    pub black_elo: Option<u32>,
    #[serde(default)]
    pub white_title: Option<String>,
    #[serde(default)]
    pub black_title: Option<String>,
    pub result: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    pub moves: String,
    #[serde(default)]
    pub ply_count: u32,
    #[serde(default)]
    pub eco: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl CorpusGameFields {
    pub fn into_record(self, index: u64) -> GameRecord {
        GameRecord {
            index,
            white: self.white,
            black: self.black,
            white_elo: self.white_elo,
            black_elo: self.black_elo,
            white_title: self.white_title,
            black_title: self.black_title,
            result: self.result,
            date: self.date,
            event: self.event,
            moves: self.moves,
            ply_count: self.ply_count,
            eco: self.eco,
            source: self.source,
        }
    }
}

/// A fixed-capacity batch of game records, the unit of storage and caching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: u64,
    /// First sequence index covered by this chunk (inclusive).
    pub start: u64,
    /// Last sequence index covered by this chunk (exclusive).
    pub end: u64,
    pub games: Vec<GameRecord>,
}

impl Chunk {
    pub fn find(&self, index: u64) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.index == index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRange {
    pub id: u64,
    pub start: u64,
    pub end: u64,
    pub count: usize,
}

/// Chunk id to index range, written next to the chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkManifest {
    pub chunk_size: u64,
    pub total_games: u64,
    pub chunks: Vec<ChunkRange>,
}

/// Name index entry: the canonical FEN and games of one named opening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningEntry {
    pub fen: String,
    pub eco: String,
    /// Ingestion order, not sorted.
    pub game_ids: Vec<u64>,
}

/// White and black names of one game. Empty for padded gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlayerPair {
    pub white: String,
    pub black: String,
}

impl PlayerPair {
    pub fn is_placeholder(&self) -> bool {
        self.white.is_empty() && self.black.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_line_with_classification() {
        let line = r#"{"white":"Carlsen, Magnus","black":"Caruana, Fabiano","white_elo":2850,
            "result":"1-0","moves":"1. e4 e5","eco":"C20",
            "classification":{"name":"King's Pawn Game","eco":"C20",
            "fen":"rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"}}"#;
        let game: CorpusGame = serde_json::from_str(line).unwrap();
        assert_eq!(game.index, None);
        assert_eq!(game.game.white_elo, Some(2850));
        assert_eq!(game.game.black_elo, None);
        assert_eq!(
            game.classification.as_ref().map(|c| c.name.as_str()),
            Some("King's Pawn Game")
        );
    }

    #[test]
    fn test_average_rating_ignores_missing() {
        let mut game = GameRecord {
            white_elo: Some(2700),
            black_elo: Some(2500),
            ..Default::default()
        };
        assert_eq!(game.average_rating(), 2600.0);
        game.black_elo = None;
        assert_eq!(game.average_rating(), 2700.0);
        game.white_elo = None;
        assert_eq!(game.average_rating(), 0.0);
    }

    #[test]
    fn test_opponent_of() {
        let game = GameRecord {
            white: "Anand".into(),
            black: "Kramnik".into(),
            ..Default::default()
        };
        assert_eq!(game.opponent_of("Anand"), Some("Kramnik"));
        assert_eq!(game.opponent_of("Kramnik"), Some("Anand"));
        assert_eq!(game.opponent_of("Topalov"), None);
    }
}
