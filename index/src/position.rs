//! Position keys.
//!
//! A FEN carries six fields; only the first (piece placement) identifies the
//! board. Everything that matches "by position" goes through [`position_key`].

/// Return the board-layout projection of a FEN: its first whitespace-delimited
/// field. Empty or blank input yields an empty key.
pub fn position_key(fen: &str) -> &str {
    fen.split_whitespace().next().unwrap_or("")
}

/// Whether two FENs describe the same board, ignoring side to move, castling,
/// en passant and move counters.
pub fn same_position(a: &str, b: &str) -> bool {
    position_key(a) == position_key(b)
}

/// Cheap shape check for request validation. Does not validate the board.
pub fn is_fen_like(fen: &str) -> bool {
    let key = position_key(fen);
    !key.is_empty() && key.split('/').count() == 8
}
