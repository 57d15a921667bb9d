//! Read-side queries over a loaded [`Indexes`](crate::Indexes) set.
//!
//! Pure lookups take `&Indexes`; anything that needs full game records goes
//! through an [`Explorer`](crate::Explorer) and its chunk store.

mod eco;
mod games;
mod moves;
mod players;
mod resolve;
mod strategy;

pub use eco::{list_openings_by_eco_category, EcoCategories, EcoGroup};
pub use games::{list_games_at_position, list_games_for_player_and_openings, title_rank, GamePage};
pub use moves::{get_game_moves, with_result_token, GameMoves};
pub use players::{
    compare_names, count_players, list_players_for_openings, paginate, sort_players, PlayerCount,
    PlayerPage,
};
pub use resolve::{resolve_position, PositionResolution, ResolveRequest, DEFAULT_PAGE_SIZE};
pub use strategy::{
    continuation_match, exact_match, position_match, resolve_direct, MatchSet, OpeningRef,
    Strategy, DIRECT_STRATEGIES,
};

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("game {0} not found")]
    GameNotFound(u64),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Field the player list is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Name,
    #[default]
    GameCount,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "gameCount" | "game-count" | "count" => Ok(Self::GameCount),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_params_parse() {
        assert_eq!("name".parse::<SortBy>().unwrap(), SortBy::Name);
        assert_eq!("gameCount".parse::<SortBy>().unwrap(), SortBy::GameCount);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("rating".parse::<SortBy>().is_err());
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_params_wire_names() {
        assert_eq!(serde_json::to_string(&SortBy::GameCount).unwrap(), "\"gameCount\"");
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"desc\"");
    }
}
