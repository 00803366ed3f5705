pub mod config;
pub mod game_state;
pub mod messages;
pub mod reconnect;
pub mod resolve;
pub mod socketio;
pub mod sync;
pub mod view;

pub use config::ClientConfig;
pub use game_state::{Board, Cell, GameState, Mark, Position, StateError, WinningLine, BOARD_SIZE};
pub use messages::{ClientEvent, ProtocolError, ServerEvent};
pub use reconnect::{Backoff, Reconnect, ReconnectPolicy, SessionOutcome};
pub use socketio::{Session, Step};
pub use sync::{ConnectionState, SendError, SendMsg, SyncClient, TransportEvent, Update};
