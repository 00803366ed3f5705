//! The client side of the game channel.
//!
//! [`SyncClient`] is the only writer of the canonical [`GameState`] and of the
//! [`ConnectionState`]. Every update is a whole-value replacement performed by
//! one of its transition methods, so readers never see a half-applied event.

use crate::game_state::{GameState, Position};
use crate::messages::{ClientEvent, ProtocolError, ServerEvent};
use crate::resolve::resolve_move;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Error sending message")]
    ChannelClosed,
    #[error("Could not encode message: {0}")]
    Encode(#[from] ProtocolError),
}

// Outbound half of the channel
pub trait SendMsg {
    fn send(&self, msg: &str) -> Result<(), SendError>;
    // Releases the underlying connection. Safe to call more than once.
    fn close(&self);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

// What the transport reports to the client
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    Connecting,
    Connected,
    Disconnected,
    Frame(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    // The canonical state was replaced
    Replaced,
    // The server refused a move. Canonical state is untouched.
    Rejected(Position),
    Connection(ConnectionState),
    // Nothing observable changed
    Ignored,
}

pub struct SyncClient<S: SendMsg> {
    sender: S,
    connection: ConnectionState,
    state: GameState,
}

impl<S: SendMsg> SyncClient<S> {
    pub fn new(sender: S) -> Self {
        SyncClient {
            sender,
            connection: ConnectionState::Disconnected,
            state: GameState::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn handle(&mut self, event: TransportEvent) -> Update {
        match event {
            TransportEvent::Connecting => self.set_connection(ConnectionState::Connecting),
            TransportEvent::Connected => self.set_connection(ConnectionState::Connected),
            // The last known game stays on screen while the channel is down
            TransportEvent::Disconnected => self.set_connection(ConnectionState::Disconnected),
            TransportEvent::Frame(frame) => self.handle_frame(&frame),
        }
    }

    pub fn handle_frame(&mut self, frame: &str) -> Update {
        let event = match ServerEvent::decode(frame) {
            Ok(event) => event,
            Err(err) => {
                warn!("Dropping undecodable frame: {}", err);
                return Update::Ignored;
            }
        };
        let name = event.name();
        match self.apply(event) {
            Ok(update) => update,
            Err(err) => {
                warn!(event = name, "Dropping event: {}", err);
                Update::Ignored
            }
        }
    }

    pub fn apply(&mut self, event: ServerEvent) -> Result<Update, ProtocolError> {
        match event {
            ServerEvent::GameState(snapshot) => {
                self.replace(GameState::try_from(snapshot)?);
            }
            ServerEvent::GameReset(snapshot) => {
                info!("Game reset by server");
                self.replace(GameState::try_from(snapshot)?);
            }
            ServerEvent::MoveMade(delta) => {
                if let (Some(position), Some(player)) = (delta.position, delta.player) {
                    debug!(%position, %player, "Move made");
                }
                self.replace(resolve_move(delta)?);
            }
            ServerEvent::InvalidMove(invalid) => {
                warn!(position = %invalid.position, "Move rejected by server");
                return Ok(Update::Rejected(invalid.position));
            }
        }
        Ok(Update::Replaced)
    }

    // Returns whether a request was sent. Nothing is queued while the
    // channel is down.
    pub fn request_reset(&self) -> Result<bool, SendError> {
        if self.connection != ConnectionState::Connected {
            debug!(connection = %self.connection, "Skipping reset request");
            return Ok(false);
        }
        let msg = ClientEvent::ResetGame.encode()?;
        self.sender.send(&msg)?;
        info!("Requested game reset");
        Ok(true)
    }

    pub fn shutdown(&mut self) {
        self.sender.close();
        self.connection = ConnectionState::Disconnected;
        info!("Channel closed");
    }

    fn replace(&mut self, state: GameState) {
        debug!(?state, "Replacing game state");
        self.state = state;
    }

    fn set_connection(&mut self, connection: ConnectionState) -> Update {
        if self.connection == connection {
            return Update::Ignored;
        }
        info!(from = %self.connection, to = %connection, "Connection state changed");
        self.connection = connection;
        Update::Connection(connection)
    }
}
