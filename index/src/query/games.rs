//! Game listings at a position and per player.
//!
//! Position listings rank games by the strongest title present, then by
//! average rating.

use super::players::{compare_names, paginate};
use super::strategy::resolve_direct;
use super::QueryError;
use crate::indexes::Explorer;
use crate::model::GameRecord;
use crate::store::BlobStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamePage {
    pub games: Vec<GameRecord>,
    /// Games at the position, across all pages.
    pub total: usize,
}

const TITLE_ORDER: [&str; 9] = ["GM", "IM", "WGM", "FM", "WIM", "CM", "WFM", "NM", "WCM"];

/// Rank of a FIDE-style title, lower is stronger. Missing or unknown titles
/// rank after every named one.
pub fn title_rank(title: Option<&str>) -> u8 {
    let Some(title) = title.map(str::trim) else {
        return TITLE_ORDER.len() as u8;
    };
    TITLE_ORDER
        .iter()
        .position(|t| t.eq_ignore_ascii_case(title))
        .unwrap_or(TITLE_ORDER.len()) as u8
}

fn best_title_rank(game: &GameRecord) -> u8 {
    title_rank(game.white_title.as_deref()).min(title_rank(game.black_title.as_deref()))
}

fn by_caliber(a: &GameRecord, b: &GameRecord) -> Ordering {
    best_title_rank(a)
        .cmp(&best_title_rank(b))
        .then_with(|| b.average_rating().total_cmp(&a.average_rating()))
}

/// Games at exactly this position: direct chain only, no continuations and no
/// fallback. The raw id list is paginated first, then the page is ordered by
/// title rank and average rating.
pub async fn list_games_at_position<S: BlobStore>(
    explorer: &Explorer<S>,
    fen: &str,
    page: usize,
    page_size: usize,
) -> Result<GamePage, QueryError> {
    let indexes = explorer.indexes().await?;
    let Some((stage, matched)) = resolve_direct(fen, indexes) else {
        return Ok(GamePage {
            games: Vec::new(),
            total: 0,
        });
    };

    let page_ids = paginate(&matched.game_ids, page, page_size);
    tracing::debug!(
        fen,
        stage,
        total = matched.game_ids.len(),
        page_ids = page_ids.len(),
        "Listing games"
    );

    let chunks = explorer.chunks().await?;
    let mut games = Vec::with_capacity(page_ids.len());
    for (id, game) in page_ids.iter().zip(chunks.get_games(&page_ids).await?) {
        match game {
            Some(game) => games.push(game),
            None => tracing::warn!(game_id = *id, "Indexed game missing from chunk store"),
        }
    }
    games.sort_by(by_caliber);

    Ok(GamePage {
        games,
        total: matched.game_ids.len(),
    })
}

/// Games from the named openings in which `player` sat on either side,
/// ordered by opponent name.
pub async fn list_games_for_player_and_openings<S: BlobStore>(
    explorer: &Explorer<S>,
    player: &str,
    names: &[String],
) -> Result<Vec<GameRecord>, QueryError> {
    if player.trim().is_empty() {
        return Err(QueryError::InvalidInput("player is required".to_string()));
    }
    if names.iter().all(|n| n.trim().is_empty()) {
        return Err(QueryError::InvalidInput(
            "at least one opening name is required".to_string(),
        ));
    }

    let indexes = explorer.indexes().await?;
    let mut seen = HashSet::new();
    let ids: Vec<u64> = names
        .iter()
        .filter_map(|name| indexes.openings.get(name))
        .flat_map(|entry| entry.game_ids.iter().copied())
        .filter(|id| seen.insert(*id))
        .filter(|&id| {
            indexes
                .players_of(id)
                .is_some_and(|pair| pair.white == player || pair.black == player)
        })
        .collect();

    let chunks = explorer.chunks().await?;
    let mut games: Vec<GameRecord> = chunks
        .get_games(&ids)
        .await?
        .into_iter()
        .flatten()
        .collect();
    games.sort_by(|a, b| {
        let opp_a = a.opponent_of(player).unwrap_or_default();
        let opp_b = b.opponent_of(player).unwrap_or_default();
        compare_names(opp_a, opp_b).then(a.index.cmp(&b.index))
    });

    tracing::debug!(player, openings = names.len(), games = games.len(), "Listed player games");
    Ok(games)
}
