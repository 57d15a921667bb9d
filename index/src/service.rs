//! Request boundary for outer collaborators.
//!
//! Every operation validates its input before touching the indexes and maps
//! failures to a [`ServiceError`] with a caller-facing kind.

use crate::indexes::Explorer;
use crate::model::GameRecord;
use crate::position::is_fen_like;
use crate::query::{
    self, EcoCategories, GameMoves, GamePage, PlayerPage, PositionResolution, QueryError,
    ResolveRequest, SortBy, SortOrder,
};
use crate::store::{BlobStore, StoreError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Internal => write!(f, "internal error"),
        }
    }
}

impl ServiceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    /// Logs `source` and hides it from the caller.
    pub fn internal(source: &dyn std::error::Error) -> Self {
        tracing::error!(error = %source, "Internal error");
        Self {
            kind: ErrorKind::Internal,
            message: "internal error".to_string(),
        }
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidInput(msg) => Self::invalid_argument(msg),
            QueryError::GameNotFound(id) => Self::not_found(format!("Game {id} not found")),
            QueryError::Store(e) => Self::internal(&e),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::internal(&err)
    }
}

fn validate_fen(fen: &str) -> Result<(), ServiceError> {
    if is_fen_like(fen) {
        Ok(())
    } else {
        Err(ServiceError::invalid_argument(format!("Invalid FEN: {fen:?}")))
    }
}

fn validate_page_size(page_size: usize) -> Result<(), ServiceError> {
    if page_size == 0 {
        return Err(ServiceError::invalid_argument("page_size must be positive"));
    }
    Ok(())
}

fn validate_names(names: &[String]) -> Result<(), ServiceError> {
    if names.iter().all(|n| n.trim().is_empty()) {
        return Err(ServiceError::invalid_argument("Opening names are required"));
    }
    Ok(())
}

pub struct ExplorerService<S> {
    explorer: Arc<Explorer<S>>,
}

impl<S: BlobStore> ExplorerService<S> {
    pub fn new(explorer: Arc<Explorer<S>>) -> Self {
        Self { explorer }
    }

    pub async fn resolve_position(
        &self,
        request: &ResolveRequest,
    ) -> Result<PositionResolution, ServiceError> {
        tracing::info!(
            fen = %request.fen,
            fallback = ?request.fallback_fen,
            page = request.page,
            "resolve_position"
        );
        validate_fen(&request.fen)?;
        if let Some(fallback) = request.fallback_fen.as_deref() {
            validate_fen(fallback)?;
        }
        validate_page_size(request.page_size)?;

        let indexes = self.explorer.indexes().await?;
        Ok(query::resolve_position(indexes, request))
    }

    pub async fn list_games_at_position(
        &self,
        fen: &str,
        page: usize,
        page_size: usize,
    ) -> Result<GamePage, ServiceError> {
        tracing::info!(fen, page, page_size, "list_games_at_position");
        validate_fen(fen)?;
        validate_page_size(page_size)?;

        Ok(query::list_games_at_position(&self.explorer, fen, page, page_size).await?)
    }

    pub async fn list_openings_by_eco_category(&self) -> Result<EcoCategories, ServiceError> {
        tracing::info!("list_openings_by_eco_category");
        let indexes = self.explorer.indexes().await?;
        Ok(query::list_openings_by_eco_category(indexes))
    }

    pub async fn list_games_for_player_and_openings(
        &self,
        player: &str,
        names: &[String],
    ) -> Result<Vec<GameRecord>, ServiceError> {
        tracing::info!(player, openings = names.len(), "list_games_for_player_and_openings");
        if player.trim().is_empty() {
            return Err(ServiceError::invalid_argument("Player is required"));
        }
        validate_names(names)?;

        Ok(query::list_games_for_player_and_openings(&self.explorer, player, names).await?)
    }

    pub async fn list_players_for_openings(
        &self,
        names: &[String],
        page: usize,
        page_size: usize,
        sort_by: SortBy,
        sort_order: SortOrder,
    ) -> Result<PlayerPage, ServiceError> {
        tracing::info!(openings = names.len(), page, page_size, "list_players_for_openings");
        validate_names(names)?;
        validate_page_size(page_size)?;

        let indexes = self.explorer.indexes().await?;
        Ok(query::list_players_for_openings(
            indexes, names, page, page_size, sort_by, sort_order,
        )?)
    }

    pub async fn get_game_moves(&self, game_id: u64) -> Result<GameMoves, ServiceError> {
        tracing::info!(game_id, "get_game_moves");
        Ok(query::get_game_moves(&self.explorer, game_id).await?)
    }
}
