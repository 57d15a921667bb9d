//! Move text of a single game.

use super::QueryError;
use crate::indexes::Explorer;
use crate::store::BlobStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMoves {
    pub moves: String,
    pub white: String,
    pub black: String,
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub white_title: Option<String>,
    pub black_title: Option<String>,
    pub event: Option<String>,
    pub date: Option<String>,
    pub result: String,
}

/// Move text terminated by its result token. Text that already ends with the
/// token is returned trimmed but otherwise unchanged.
pub fn with_result_token(moves: &str, result: &str) -> String {
    let moves = moves.trim_end();
    let result = result.trim();
    if result.is_empty() || moves.ends_with(result) {
        return moves.to_string();
    }
    if moves.is_empty() {
        return result.to_string();
    }
    format!("{moves} {result}")
}

pub async fn get_game_moves<S: BlobStore>(
    explorer: &Explorer<S>,
    game_id: u64,
) -> Result<GameMoves, QueryError> {
    let chunks = explorer.chunks().await?;
    let game = chunks
        .get_game(game_id)
        .await?
        .ok_or(QueryError::GameNotFound(game_id))?;

    Ok(GameMoves {
        moves: with_result_token(&game.moves, &game.result),
        white: game.white,
        black: game.black,
        white_elo: game.white_elo,
        black_elo: game.black_elo,
        white_title: game.white_title,
        black_title: game.black_title,
        event: game.event,
        date: game.date,
        result: game.result,
    })
}
