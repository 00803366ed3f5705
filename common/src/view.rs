// Read-only projections of the canonical state for the presentation layer.
// Terminal fields are only surfaced once the game is over.

use crate::game_state::{GameState, Mark, Position, BOARD_SIZE};
use crate::sync::ConnectionState;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SquareView {
    pub mark: Option<Mark>,
    pub is_winning: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Banner {
    Winner(Mark),
    Draw,
}

impl Banner {
    pub fn title(&self) -> String {
        match self {
            Banner::Winner(mark) => format!("Player {} Wins!", mark),
            Banner::Draw => "It's a Draw!".to_string(),
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Banner::Winner(_) => "Congratulations!",
            Banner::Draw => "Well played! Try again.",
        }
    }
}

pub fn squares(state: &GameState) -> [SquareView; BOARD_SIZE] {
    let line = state.winning_line().filter(|_| state.game_over());
    let mut squares = [SquareView {
        mark: None,
        is_winning: false,
    }; BOARD_SIZE];
    for (idx, cell) in state.board().cells().iter().enumerate() {
        let is_winning = match (line, Position::new(idx)) {
            (Some(line), Ok(position)) => line.contains(position),
            _ => false,
        };
        squares[idx] = SquareView {
            mark: *cell,
            is_winning,
        };
    }
    squares
}

pub fn banner(state: &GameState) -> Option<Banner> {
    if !state.game_over() {
        return None;
    }
    match state.winner() {
        Some(mark) => Some(Banner::Winner(mark)),
        None if state.is_draw() => Some(Banner::Draw),
        None => None,
    }
}

// Whose light is lit, or nothing once the game has ended
pub fn turn(state: &GameState) -> Option<Mark> {
    if state.game_over() {
        None
    } else {
        Some(state.current_player())
    }
}

pub fn connection_label(connection: ConnectionState) -> &'static str {
    match connection {
        ConnectionState::Connected => "● Connected",
        ConnectionState::Connecting => "○ Connecting…",
        ConnectionState::Disconnected => "○ Disconnected",
    }
}

pub fn can_reset(connection: ConnectionState) -> bool {
    connection == ConnectionState::Connected
}
