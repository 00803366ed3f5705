use crate::sync::TransportEvent;
use std::time::Duration;

pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MULTIPLIER: u32 = 2;

/// How long to wait between attempts to re-open a lost channel.
///
/// Delays grow geometrically from `initial_delay` by `multiplier` and are
/// capped at `max_delay`. With `max_attempts` set, the client gives up after
/// that many consecutive failed attempts.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconnectPolicy {
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            max_attempts: None,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl ReconnectPolicy {
    // `attempt` is zero-based
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }
        let delay = self
            .multiplier
            .checked_pow(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            policy: self.clone(),
            attempt: 0,
        }
    }
}

// How a single connection attempt ended
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    // The client closed the channel on purpose
    Closed,
    // The namespace join was acknowledged and the socket later dropped
    Lost,
    // The socket failed to open, or dropped before the join was acknowledged
    Failed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Reconnect {
    Stop,
    After(Duration),
    GiveUp,
}

impl Reconnect {
    // What to report once the session is over. Nothing is reported after a
    // deliberate close.
    pub fn transport_event(&self) -> Option<TransportEvent> {
        match self {
            Reconnect::Stop => None,
            Reconnect::After(_) | Reconnect::GiveUp => Some(TransportEvent::Disconnected),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl Backoff {
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.policy.delay_for(self.attempt)?;
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }

    // Called once a connection has been established
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    // Only a session that actually joined counts as a successful connection
    // and restarts the delay sequence.
    pub fn after_session(&mut self, outcome: SessionOutcome) -> Reconnect {
        match outcome {
            SessionOutcome::Closed => return Reconnect::Stop,
            SessionOutcome::Lost => self.reset(),
            SessionOutcome::Failed => {}
        }
        match self.next_delay() {
            Some(delay) => Reconnect::After(delay),
            None => Reconnect::GiveUp,
        }
    }
}
