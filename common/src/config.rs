use crate::reconnect::ReconnectPolicy;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5000;
// Engine.IO v4 straight over websocket, skipping the long-polling upgrade
pub const SOCKET_PATH: &str = "/socket.io/";
pub const SOCKET_QUERY: &str = "?EIO=4&transport=websocket";
pub const REJECTED_NOTICE: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub reconnect: ReconnectPolicy,
    // How long the "move rejected" notice stays on screen
    pub rejected_notice: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: socket_url("http:", DEFAULT_HOST, DEFAULT_PORT),
            reconnect: ReconnectPolicy::default(),
            rejected_notice: REJECTED_NOTICE,
        }
    }
}

impl ClientConfig {
    // The game server runs on the machine that served the page, so the socket
    // URL is derived from the page location unless explicitly overridden.
    pub fn from_location(protocol: &str, hostname: &str, server_override: Option<String>) -> Self {
        let server_url = match server_override.filter(|url| !url.trim().is_empty()) {
            Some(url) => url.trim().to_string(),
            None => socket_url(protocol, hostname, DEFAULT_PORT),
        };
        ClientConfig {
            server_url,
            ..ClientConfig::default()
        }
    }
}

pub fn socket_url(protocol: &str, hostname: &str, port: u16) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    let host = match hostname.trim() {
        "" | DEFAULT_HOST => DEFAULT_HOST,
        host => host,
    };
    format!("{}://{}:{}{}{}", scheme, host, port, SOCKET_PATH, SOCKET_QUERY)
}
