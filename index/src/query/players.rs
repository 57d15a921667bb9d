//! Player tallies over game sets, with name ordering and pagination.

use super::{QueryError, SortBy, SortOrder};
use crate::indexes::Indexes;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCount {
    pub player: String,
    pub game_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPage {
    pub masters: Vec<PlayerCount>,
    pub total: usize,
    pub total_games: usize,
}

/// Count games per player over `game_ids`, both colours accumulating.
/// Unknown ids and padded gaps are skipped.
pub fn count_players<'a, I>(indexes: &Indexes, game_ids: I) -> Vec<PlayerCount>
where
    I: IntoIterator<Item = &'a u64>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for &id in game_ids {
        let Some(pair) = indexes.players_of(id) else {
            continue;
        };
        for side in [pair.white.as_str(), pair.black.as_str()] {
            if !side.is_empty() {
                *counts.entry(side).or_insert(0) += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|(player, game_count)| PlayerCount {
            player: player.to_string(),
            game_count,
        })
        .collect()
}

/// Locale-style name comparison: case-insensitive first, then exact, so the
/// order is total and stable.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

pub fn sort_players(players: &mut [PlayerCount], sort_by: SortBy, sort_order: SortOrder) {
    players.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Name => compare_names(&a.player, &b.player),
            SortBy::GameCount => a.game_count.cmp(&b.game_count),
        };
        let ordering = match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        // Equal counts fall back to name ascending whatever the order.
        ordering.then_with(|| compare_names(&a.player, &b.player))
    });
}

/// Zero-based page slice `[page*page_size, page*page_size+page_size)`.
/// Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    let start = page.saturating_mul(page_size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(items.len());
    items[start..end].to_vec()
}

/// Player aggregation seeded from explicit opening names.
pub fn list_players_for_openings(
    indexes: &Indexes,
    names: &[String],
    page: usize,
    page_size: usize,
    sort_by: SortBy,
    sort_order: SortOrder,
) -> Result<PlayerPage, QueryError> {
    if names.iter().all(|n| n.trim().is_empty()) {
        return Err(QueryError::InvalidInput(
            "at least one opening name is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut game_ids = Vec::new();
    for name in names {
        match indexes.openings.get(name) {
            Some(entry) => {
                game_ids.extend(entry.game_ids.iter().copied().filter(|id| seen.insert(*id)))
            }
            None => tracing::debug!(name = %name, "Unknown opening name"),
        }
    }

    let mut masters = count_players(indexes, &game_ids);
    sort_players(&mut masters, sort_by, sort_order);
    Ok(PlayerPage {
        total: masters.len(),
        masters: paginate(&masters, page, page_size),
        total_games: game_ids.len(),
    })
}
