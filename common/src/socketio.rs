//! Socket.IO framing over the Engine.IO v4 websocket transport.
//!
//! Each websocket text frame is one Engine.IO packet: a type digit followed
//! by an optional payload. Socket.IO packets ride inside Engine.IO `message`
//! packets (type `4`), so an event arrives as `42["name",{...}]`.
//!
//! [`Session`] drives one connection attempt: it answers the `0` open packet
//! by joining the default namespace (`40`), answers pings, and only reports
//! the connection as up once the server acknowledges the namespace join.

use crate::messages::ProtocolError;
use crate::reconnect::SessionOutcome;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const OPEN: char = '0';
pub const CLOSE: char = '1';
pub const PING: char = '2';
pub const PONG: char = '3';
pub const MESSAGE: char = '4';
pub const NOOP: char = '6';

pub const CONNECT: char = '0';
pub const DISCONNECT: char = '1';
pub const EVENT: char = '2';
pub const CONNECT_ERROR: char = '4';

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping(String),
    Pong,
    Noop,
    Connect,
    Disconnect,
    Event(String),
    ConnectError(String),
}

impl Packet {
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ProtocolError::Packet(frame.to_string()))?;
        let rest = chars.as_str();
        match kind {
            OPEN => Ok(Packet::Open(serde_json::from_str(rest)?)),
            CLOSE => Ok(Packet::Close),
            PING => Ok(Packet::Ping(rest.to_string())),
            PONG => Ok(Packet::Pong),
            NOOP => Ok(Packet::Noop),
            MESSAGE => decode_message(frame, rest),
            _ => Err(ProtocolError::Packet(frame.to_string())),
        }
    }
}

fn decode_message(frame: &str, body: &str) -> Result<Packet, ProtocolError> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ProtocolError::Packet(frame.to_string()))?;
    let rest = chars.as_str();
    match kind {
        CONNECT => Ok(Packet::Connect),
        DISCONNECT => Ok(Packet::Disconnect),
        EVENT => Ok(Packet::Event(rest.to_string())),
        CONNECT_ERROR => Ok(Packet::ConnectError(rest.to_string())),
        _ => Err(ProtocolError::Packet(frame.to_string())),
    }
}

// Splits an event frame (`42[...]`, `42/ns,[...]` or `4217[...]` with an ack
// id) into its name and first argument.
pub fn decode_event(frame: &str) -> Result<(String, Value), ProtocolError> {
    let body = match Packet::decode(frame)? {
        Packet::Event(body) => body,
        _ => return Err(ProtocolError::NotAnEvent(frame.to_string())),
    };
    let mut body = body.as_str();
    if body.starts_with('/') {
        body = match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => return Err(ProtocolError::Packet(frame.to_string())),
        };
    }
    let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut args: Vec<Value> = serde_json::from_str(body)?;
    if args.is_empty() {
        return Err(ProtocolError::Packet(frame.to_string()));
    }
    let name = match args.remove(0) {
        Value::String(name) => name,
        _ => return Err(ProtocolError::Packet(frame.to_string())),
    };
    let data = if args.is_empty() {
        Value::Null
    } else {
        args.remove(0)
    };
    Ok((name, data))
}

pub fn encode_event(name: &str, data: Option<&Value>) -> Result<String, ProtocolError> {
    let args = match data {
        Some(data) => serde_json::to_string(&(name, data))?,
        None => serde_json::to_string(&[name])?,
    };
    Ok(format!("{}{}{}", MESSAGE, EVENT, args))
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Phase {
    // Socket opening, waiting for the Engine.IO open packet
    #[default]
    Opening,
    // Namespace join sent, waiting for the server to acknowledge it
    Joining,
    Connected,
    Closed,
}

// What the transport should do with an inbound frame
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Reply(String),
    Connected,
    Deliver(String),
    Closed,
    Ignore,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    phase: Phase,
    handshake: Option<Handshake>,
    joined: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Connected
    }

    pub fn handshake(&self) -> Option<&Handshake> {
        self.handshake.as_ref()
    }

    // The socket itself went away
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }

    // How the session ended when the socket dropped or the server closed it.
    // A session that never got its join acknowledged is a failed attempt.
    pub fn outcome(&self) -> SessionOutcome {
        if self.joined {
            SessionOutcome::Lost
        } else {
            SessionOutcome::Failed
        }
    }

    pub fn on_frame(&mut self, frame: &str) -> Step {
        let packet = match Packet::decode(frame) {
            Ok(packet) => packet,
            Err(err) => {
                warn!("Dropping frame: {}", err);
                return Step::Ignore;
            }
        };
        match (self.phase, packet) {
            (Phase::Closed, _) => Step::Ignore,
            (Phase::Opening, Packet::Open(handshake)) => {
                debug!(sid = %handshake.sid, "Engine.IO session opened");
                self.handshake = Some(handshake);
                self.phase = Phase::Joining;
                Step::Reply(format!("{}{}", MESSAGE, CONNECT))
            }
            (Phase::Joining, Packet::Connect) => {
                info!("Socket.IO namespace joined");
                self.phase = Phase::Connected;
                self.joined = true;
                Step::Connected
            }
            (_, Packet::Ping(payload)) => Step::Reply(format!("{}{}", PONG, payload)),
            (Phase::Connected, Packet::Event(_)) => Step::Deliver(frame.to_string()),
            (_, Packet::ConnectError(reason)) => {
                warn!(%reason, "Server refused namespace join");
                self.phase = Phase::Closed;
                Step::Closed
            }
            (_, Packet::Close) | (_, Packet::Disconnect) => {
                info!("Server closed the session");
                self.phase = Phase::Closed;
                Step::Closed
            }
            (phase, packet) => {
                debug!(?phase, ?packet, "Ignoring packet");
                Step::Ignore
            }
        }
    }

    // Outbound frames only go out on a joined session. Anything else is
    // dropped, never queued.
    pub fn outbound(&self, frame: String) -> Option<String> {
        if self.is_connected() {
            Some(frame)
        } else {
            debug!(phase = ?self.phase, "Dropping outbound frame: {}", frame);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OPEN_FRAME: &str =
        r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

    #[test]
    fn test_decode_packets() {
        match Packet::decode(OPEN_FRAME).unwrap() {
            Packet::Open(handshake) => {
                assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(handshake.ping_interval, 25000);
                assert_eq!(handshake.ping_timeout, 20000);
            }
            other => panic!("unexpected packet {:?}", other),
        }
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping(String::new()));
        assert_eq!(Packet::decode("3").unwrap(), Packet::Pong);
        assert_eq!(Packet::decode("1").unwrap(), Packet::Close);
        assert_eq!(Packet::decode("40").unwrap(), Packet::Connect);
        assert_eq!(
            Packet::decode(r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).unwrap(),
            Packet::Connect
        );
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
        assert!(Packet::decode("").is_err());
        assert!(Packet::decode("9").is_err());
        assert!(Packet::decode("4").is_err());
    }

    #[test]
    fn test_decode_event() {
        let (name, data) =
            decode_event(r#"42["invalid_move",{"position":4}]"#).unwrap();
        assert_eq!(name, "invalid_move");
        assert_eq!(data, json!({ "position": 4 }));
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack() {
        let (name, data) = decode_event(r#"42/game,17["game_reset",{"a":1}]"#).unwrap();
        assert_eq!(name, "game_reset");
        assert_eq!(data, json!({ "a": 1 }));
        let (name, data) = decode_event(r#"4212["reset_game"]"#).unwrap();
        assert_eq!(name, "reset_game");
        assert_eq!(data, Value::Null);
    }

    #[test]
    fn test_decode_event_rejects_other_packets() {
        assert!(matches!(
            decode_event("40"),
            Err(ProtocolError::NotAnEvent(_))
        ));
        assert!(matches!(decode_event("2"), Err(ProtocolError::NotAnEvent(_))));
        assert!(decode_event("42[]").is_err());
        assert!(decode_event("42[3,{}]").is_err());
        assert!(decode_event(r#"{"event":"game_state"}"#).is_err());
    }

    #[test]
    fn test_encode_event() {
        assert_eq!(
            encode_event("reset_game", None).unwrap(),
            r#"42["reset_game"]"#
        );
        assert_eq!(
            encode_event("request_state", Some(&json!({ "x": 1 }))).unwrap(),
            r#"42["request_state",{"x":1}]"#
        );
    }

    #[test]
    fn test_handshake_joins_namespace() {
        let mut session = Session::new();
        assert_eq!(session.phase(), Phase::Opening);
        assert_eq!(session.on_frame(OPEN_FRAME), Step::Reply("40".to_string()));
        assert_eq!(session.phase(), Phase::Joining);
        assert!(!session.is_connected());
        assert_eq!(
            session.on_frame(r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#),
            Step::Connected
        );
        assert!(session.is_connected());
        assert_eq!(session.handshake().unwrap().sid, "lv_VI97HAXpY6yYWAAAC");
    }

    #[test]
    fn test_connected_only_after_ack() {
        let mut session = Session::new();
        // an ack before the open packet does not count
        assert_eq!(session.on_frame("40"), Step::Ignore);
        assert!(!session.is_connected());
        session.on_frame(OPEN_FRAME);
        assert_eq!(
            session.on_frame(r#"44{"message":"Not authorized"}"#),
            Step::Closed
        );
        assert!(!session.is_connected());
        assert_eq!(session.on_frame("40"), Step::Ignore);
    }

    #[test]
    fn test_ping_gets_pong() {
        let mut session = Session::new();
        assert_eq!(session.on_frame("2"), Step::Reply("3".to_string()));
        session.on_frame(OPEN_FRAME);
        session.on_frame("40");
        assert_eq!(session.on_frame("2"), Step::Reply("3".to_string()));
        // any ping payload is echoed back
        assert_eq!(session.on_frame("2abc"), Step::Reply("3abc".to_string()));
    }

    #[test]
    fn test_events_delivered_once_joined() {
        let frame = r#"42["game_state",{"board":[]}]"#;
        let mut session = Session::new();
        assert_eq!(session.on_frame(frame), Step::Ignore);
        session.on_frame(OPEN_FRAME);
        assert_eq!(session.on_frame(frame), Step::Ignore);
        session.on_frame("40");
        assert_eq!(session.on_frame(frame), Step::Deliver(frame.to_string()));
    }

    #[test]
    fn test_server_close() {
        let mut session = Session::new();
        session.on_frame(OPEN_FRAME);
        session.on_frame("40");
        assert_eq!(session.on_frame("41"), Step::Closed);
        assert_eq!(session.phase(), Phase::Closed);
        assert_eq!(
            session.on_frame(r#"42["game_state",{}]"#),
            Step::Ignore
        );
        let mut session = Session::new();
        assert_eq!(session.on_frame("1"), Step::Closed);
    }

    #[test]
    fn test_outbound_dropped_until_joined() {
        let frame = r#"42["reset_game"]"#.to_string();
        let mut session = Session::new();
        assert_eq!(session.outbound(frame.clone()), None);
        session.on_frame(OPEN_FRAME);
        assert_eq!(session.outbound(frame.clone()), None);
        session.on_frame("40");
        assert_eq!(session.outbound(frame.clone()), Some(frame.clone()));
        session.on_frame("41");
        assert_eq!(session.outbound(frame), None);
    }

    #[test]
    fn test_socket_drop_closes_session() {
        let mut session = Session::new();
        session.on_frame(OPEN_FRAME);
        session.on_frame("40");
        session.close();
        assert!(!session.is_connected());
        assert_eq!(session.outbound(r#"42["reset_game"]"#.to_string()), None);
        assert_eq!(session.on_frame("2"), Step::Ignore);
    }

    #[test]
    fn test_outcome_depends_on_join_ack() {
        // socket opened, Engine.IO handshake done, but no namespace ack
        let mut session = Session::new();
        session.on_frame(OPEN_FRAME);
        session.close();
        assert_eq!(session.outcome(), SessionOutcome::Failed);

        let mut session = Session::new();
        session.on_frame(OPEN_FRAME);
        session.on_frame(r#"44{"message":"Not authorized"}"#);
        assert_eq!(session.outcome(), SessionOutcome::Failed);

        let mut session = Session::new();
        session.on_frame(OPEN_FRAME);
        session.on_frame("40");
        assert_eq!(session.on_frame("41"), Step::Closed);
        assert_eq!(session.outcome(), SessionOutcome::Lost);
    }

    #[test]
    fn test_failed_join_does_not_reset_backoff() {
        let mut backoff = crate::ReconnectPolicy::default().backoff();
        for expected in [500, 1000, 2000] {
            let mut session = Session::new();
            session.on_frame(OPEN_FRAME);
            session.close();
            assert_eq!(
                backoff.after_session(session.outcome()),
                crate::Reconnect::After(std::time::Duration::from_millis(expected))
            );
        }
        let mut session = Session::new();
        session.on_frame(OPEN_FRAME);
        session.on_frame("40");
        session.close();
        assert_eq!(
            backoff.after_session(session.outcome()),
            crate::Reconnect::After(std::time::Duration::from_millis(500))
        );
    }

    #[test]
    fn test_garbage_is_ignored() {
        let mut session = Session::new();
        assert_eq!(session.on_frame(""), Step::Ignore);
        assert_eq!(session.on_frame("0not json"), Step::Ignore);
        assert_eq!(session.phase(), Phase::Opening);
    }
}
