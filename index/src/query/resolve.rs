//! Position resolution: direct openings, continuations and the players of
//! both, paginated.

use super::players::{count_players, paginate, sort_players, PlayerCount};
use super::strategy::{continuation_match, resolve_direct, MatchSet, OpeningRef};
use super::{SortBy, SortOrder};
use crate::indexes::Indexes;
use crate::position::same_position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_PAGE_SIZE: usize = 50;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub fen: String,
    #[serde(default)]
    pub fallback_fen: Option<String>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl ResolveRequest {
    pub fn new(fen: impl Into<String>) -> Self {
        Self {
            fen: fen.into(),
            fallback_fen: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResolution {
    pub openings: Vec<OpeningRef>,
    pub continuations: Vec<OpeningRef>,
    pub masters: Vec<PlayerCount>,
    pub total_masters: usize,
    /// Distinct games across the direct and continuation sets.
    pub total_games: usize,
    pub direct_games: usize,
    pub continuation_games: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_descendants: bool,
    pub used_fallback_fen: bool,
}

/// Resolve a position to its openings, continuations and players.
///
/// The direct chain stops at the first stage that matches. Continuations are
/// looked up regardless. Only when both come back empty is `fallback_fen`
/// tried, and then through the direct chain alone. A fallback on the same
/// board as `fen` cannot match where `fen` did not, so it is skipped.
pub fn resolve_position(indexes: &Indexes, request: &ResolveRequest) -> PositionResolution {
    let mut direct = resolve_direct(&request.fen, indexes).map(|(_, set)| set);
    let continuations = continuation_match(&request.fen, indexes).unwrap_or_default();

    let mut used_fallback_fen = false;
    if direct.is_none() && continuations.is_empty() {
        let fallback = request.fallback_fen.as_deref().filter(|f| !f.is_empty());
        if let Some(fallback) = fallback.filter(|f| !same_position(f, &request.fen)) {
            if let Some((stage, set)) = resolve_direct(fallback, indexes) {
                tracing::debug!(fen = %request.fen, fallback, stage, "Resolved via fallback FEN");
                direct = Some(set);
                used_fallback_fen = true;
            }
        }
    }
    let direct: MatchSet = direct.unwrap_or_default();

    let mut seen = HashSet::new();
    let game_ids: Vec<u64> = direct
        .game_ids
        .iter()
        .chain(&continuations.game_ids)
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let mut masters = count_players(indexes, &game_ids);
    sort_players(&mut masters, request.sort_by, request.sort_order);

    tracing::debug!(
        fen = %request.fen,
        openings = direct.openings.len(),
        continuations = continuations.openings.len(),
        games = game_ids.len(),
        players = masters.len(),
        "Resolved position"
    );

    PositionResolution {
        total_masters: masters.len(),
        masters: paginate(&masters, request.page, request.page_size),
        total_games: game_ids.len(),
        direct_games: direct.game_ids.len(),
        continuation_games: continuations.game_ids.len(),
        has_descendants: !continuations.is_empty(),
        openings: direct.openings,
        continuations: continuations.openings,
        page: request.page,
        page_size: request.page_size,
        used_fallback_fen,
    }
}
