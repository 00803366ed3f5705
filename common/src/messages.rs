use crate::game_state::{Board, Mark, Position, StateError, WinningLine};
use crate::socketio;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Malformed Socket.IO packet: {0}")]
    Packet(String),
    #[error("Packet is not an event: {0}")]
    NotAnEvent(String),
    #[error("Move event names neither the next player nor the player who moved")]
    MissingPlayer,
    #[error("Inconsistent game state: {0}")]
    Inconsistent(#[from] StateError),
}

// Full game state as sent on connect and after a reset
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub board: Board,
    pub current_player: Mark,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<Mark>,
    #[serde(default)]
    pub winning_line: Option<WinningLine>,
    #[serde(default)]
    pub is_draw: bool,
}

// Result of a single move. Older servers only name the player who moved
// (`player`), newer ones also name whose turn is next (`next_player`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MoveDelta {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub player: Option<Mark>,
    pub board: Board,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<Mark>,
    #[serde(default)]
    pub winning_line: Option<WinningLine>,
    #[serde(default)]
    pub is_draw: bool,
    #[serde(default)]
    pub next_player: Option<Mark>,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct InvalidMove {
    pub position: Position,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    GameState(GameSnapshot),
    MoveMade(MoveDelta),
    GameReset(GameSnapshot),
    InvalidMove(InvalidMove),
}

impl ServerEvent {
    // Decodes a Socket.IO event frame such as `42["game_state",{...}]`
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let (name, data) = socketio::decode_event(frame)?;
        Ok(serde_json::from_value(json!({ "event": name, "data": data }))?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::GameState(_) => "game_state",
            ServerEvent::MoveMade(_) => "move_made",
            ServerEvent::GameReset(_) => "game_reset",
            ServerEvent::InvalidMove(_) => "invalid_move",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClientEvent {
    ResetGame,
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ResetGame => "reset_game",
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        socketio::encode_event(self.name(), None)
    }
}
