//! Position resolution strategies.
//!
//! The direct chain is an ordered list of pure functions tried in turn until
//! one yields a match. Continuations are a separate strategy that always runs.

use crate::indexes::Indexes;
use crate::model::OpeningEntry;
use crate::position::position_key;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// One opening in a result set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningRef {
    pub name: String,
    pub eco: String,
    pub fen: String,
    pub game_count: usize,
}

/// Openings and the union of their game ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSet {
    /// Deduplicated by (name, eco, fen), sorted by name.
    pub openings: Vec<OpeningRef>,
    /// First-seen order, no duplicates.
    pub game_ids: Vec<u64>,
}

impl MatchSet {
    fn collect<'a, I>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a OpeningEntry)>,
    {
        let mut openings = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut game_ids = Vec::new();

        for (name, entry) in entries {
            openings.insert(OpeningRef {
                name: name.to_string(),
                eco: entry.eco.clone(),
                fen: entry.fen.clone(),
                game_count: entry.game_ids.len(),
            });
            game_ids.extend(entry.game_ids.iter().copied().filter(|id| seen.insert(*id)));
        }

        if openings.is_empty() {
            return None;
        }
        // BTreeSet orders by name first, then eco and fen.
        Some(Self {
            openings: openings.into_iter().collect(),
            game_ids,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}

pub type Strategy = fn(&str, &Indexes) -> Option<MatchSet>;

/// Stages of the direct chain, in the order they are tried.
pub const DIRECT_STRATEGIES: &[(&str, Strategy)] =
    &[("exact", exact_match), ("position", position_match)];

/// The FEN itself is an indexed opening FEN.
pub fn exact_match(fen: &str, indexes: &Indexes) -> Option<MatchSet> {
    MatchSet::collect(indexes.openings_at(fen))
}

/// Any indexed FEN with the same board, whatever its side to move, castling
/// or en passant fields. All such FENs are unioned.
pub fn position_match(fen: &str, indexes: &Indexes) -> Option<MatchSet> {
    let position = position_key(fen);
    if position.is_empty() {
        return None;
    }
    MatchSet::collect(
        indexes
            .fens_at_position(position)
            .iter()
            .flat_map(|f| indexes.openings_at(f)),
    )
}

/// Run the direct chain. Returns the name of the stage that matched.
pub fn resolve_direct(fen: &str, indexes: &Indexes) -> Option<(&'static str, MatchSet)> {
    DIRECT_STRATEGIES.iter().find_map(|(stage, strategy)| {
        let found = strategy(fen, indexes)?;
        tracing::debug!(stage = *stage, fen, openings = found.openings.len(), "Direct match");
        Some((*stage, found))
    })
}

/// Indexed openings reachable forward from the position of `fen`: the
/// immediate successors that have games, plus the recorded descendants when
/// the position itself has none.
pub fn continuation_match(fen: &str, indexes: &Indexes) -> Option<MatchSet> {
    let position = position_key(fen);
    if position.is_empty() {
        return None;
    }

    let mut fens: Vec<&str> = Vec::new();
    for next in indexes.graph.successors(position) {
        fens.extend(
            indexes
                .fens_at_position(position_key(next))
                .iter()
                .map(String::as_str),
        );
    }
    fens.extend(indexes.descendants(position).iter().map(String::as_str));

    let mut seen = HashSet::new();
    fens.retain(|f| seen.insert(*f));

    MatchSet::collect(fens.into_iter().flat_map(|f| indexes.openings_at(f)))
}
