use common::{
    Backoff, Reconnect, ReconnectPolicy, SendError, SendMsg, Session, SessionOutcome, Step,
    TransportEvent,
};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::stream::SplitSink;
use futures::{pin_mut, select, FutureExt, SinkExt, StreamExt};
use gloo::timers::future::TimeoutFuture;
use reqwasm::websocket::{futures::WebSocket, Message};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

// Outbound half handed to the sync client. Closing it tears the socket down.
pub struct Channel(UnboundedSender<String>);

impl SendMsg for Channel {
    fn send(&self, msg: &str) -> Result<(), SendError> {
        self.0
            .unbounded_send(msg.to_string())
            .map_err(|_| SendError::ChannelClosed)
    }

    fn close(&self) {
        self.0.close_channel();
    }
}

enum WaitEnd {
    Elapsed,
    Closed,
}

pub fn connect(url: String, policy: ReconnectPolicy, on_event: Callback<TransportEvent>) -> Channel {
    let (out_tx, out_rx) = mpsc::unbounded::<String>();
    spawn_local(run(url, policy.backoff(), out_rx, on_event));
    Channel(out_tx)
}

async fn run(
    url: String,
    mut backoff: Backoff,
    mut outbound: UnboundedReceiver<String>,
    on_event: Callback<TransportEvent>,
) {
    loop {
        on_event.emit(TransportEvent::Connecting);
        let mut session = Session::new();
        let outcome = match WebSocket::open(&url) {
            Ok(ws) => drive(ws, &mut session, &mut outbound, &on_event).await,
            Err(e) => {
                error!(%url, "ws: failed to open: {:?}", e);
                SessionOutcome::Failed
            }
        };
        session.close();

        let next = backoff.after_session(outcome);
        if let Some(event) = next.transport_event() {
            on_event.emit(event);
        }
        let delay = match next {
            Reconnect::Stop => {
                info!("WebSocket closed by client");
                return;
            }
            Reconnect::GiveUp => {
                error!(attempts = backoff.attempt(), "Giving up on reconnecting");
                return;
            }
            Reconnect::After(delay) => delay,
        };
        warn!(%url, ?outcome, attempt = backoff.attempt(), ?delay, "Reconnecting after delay");
        if let WaitEnd::Closed = wait(delay, &session, &mut outbound).await {
            info!("WebSocket closed by client");
            return;
        }
    }
}

// Runs one socket until it drops or the owner closes the channel. Connected
// is only reported once the server acknowledges the namespace join.
async fn drive(
    ws: WebSocket,
    session: &mut Session,
    outbound: &mut UnboundedReceiver<String>,
    on_event: &Callback<TransportEvent>,
) -> SessionOutcome {
    let (mut write, read) = ws.split();
    let mut read = read.fuse();
    loop {
        select! {
            inbound = read.next() => {
                let data = match inbound {
                    Some(Ok(Message::Text(data))) => data,
                    Some(Ok(Message::Bytes(b))) => String::from_utf8(b).unwrap_or_else(|e| {
                        warn!("Dropping non UTF-8 binary frame: {}", e);
                        String::new()
                    }),
                    Some(Err(e)) => {
                        error!("ws: {:?}", e);
                        return session.outcome();
                    }
                    None => return session.outcome(),
                };
                debug!("from websocket: {}", data);
                // empty frames decode to nothing and are ignored
                match session.on_frame(&data) {
                    Step::Reply(reply) => {
                        debug!("to websocket: {}", reply);
                        if let Err(e) = write.send(Message::Text(reply)).await {
                            error!("ws: {:?}", e);
                            return session.outcome();
                        }
                    }
                    Step::Connected => on_event.emit(TransportEvent::Connected),
                    Step::Deliver(frame) => on_event.emit(TransportEvent::Frame(frame)),
                    Step::Closed => {
                        close(&mut write).await;
                        return session.outcome();
                    }
                    Step::Ignore => {}
                }
            },
            frame = outbound.next() => match frame {
                Some(frame) => {
                    if let Some(frame) = session.outbound(frame) {
                        debug!("to websocket: {}", frame);
                        if let Err(e) = write.send(Message::Text(frame)).await {
                            error!("ws: {:?}", e);
                            return session.outcome();
                        }
                    }
                }
                None => {
                    close(&mut write).await;
                    return SessionOutcome::Closed;
                }
            },
        }
    }
}

async fn close(write: &mut SplitSink<WebSocket, Message>) {
    if let Err(e) = write.close().await {
        warn!("Error closing websocket: {:?}", e);
    }
}

// Sleeps between attempts. The session is closed by now, so anything sent
// meanwhile is dropped rather than queued.
async fn wait(
    delay: Duration,
    session: &Session,
    outbound: &mut UnboundedReceiver<String>,
) -> WaitEnd {
    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
    let timeout = TimeoutFuture::new(millis).fuse();
    pin_mut!(timeout);
    loop {
        select! {
            _ = timeout => return WaitEnd::Elapsed,
            frame = outbound.next() => match frame {
                Some(frame) => {
                    let _ = session.outbound(frame);
                }
                None => return WaitEnd::Closed,
            },
        }
    }
}
