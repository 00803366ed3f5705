//! Turn resolution for move events.
//!
//! The field naming whose turn comes next has changed between server
//! versions, so the client accepts either shape without knowing which
//! version it is talking to.

use crate::game_state::{GameState, Mark};
use crate::messages::{MoveDelta, ProtocolError};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlayerSource {
    NextPlayer,
    Actor,
}

/// Picks the player to display as `current_player` after a move.
///
/// Priority order:
/// 1. `next_player`, when present and not null
/// 2. `player`, the mark that just moved
///
/// Returns `None` when neither field is usable.
pub fn resolve_next_player(
    next_player: Option<Mark>,
    actor: Option<Mark>,
) -> Option<(Mark, PlayerSource)> {
    next_player
        .map(|mark| (mark, PlayerSource::NextPlayer))
        .or_else(|| actor.map(|mark| (mark, PlayerSource::Actor)))
}

// Builds the replacement state for a move event. The previous canonical state
// is never consulted.
pub fn resolve_move(delta: MoveDelta) -> Result<GameState, ProtocolError> {
    let (current_player, _) =
        resolve_next_player(delta.next_player, delta.player).ok_or(ProtocolError::MissingPlayer)?;
    Ok(GameState::new(
        delta.board,
        current_player,
        delta.game_over,
        delta.winner,
        delta.winning_line,
        delta.is_draw,
    )?)
}
