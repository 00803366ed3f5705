use crate::components::{BoardComponent, ConnectionIndicator, GameStatus, TurnIndicator};
use crate::ws::{self, Channel};
use anyhow::anyhow;
use common::view;
use common::{ClientConfig, Position, SyncClient, TransportEvent, Update};
use gloo::timers::callback::Timeout;
use std::fmt;
use tracing::{debug, error, warn};
use web_sys::UrlSearchParams;
use yew::prelude::*;

#[derive(Debug, Clone)]
pub enum Message {
    Transport(TransportEvent),
    Reset,
    ClearNotice,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Transport(event) => write!(f, "Transport: {:?}", event),
            Message::Reset => write!(f, "Reset"),
            Message::ClearNotice => write!(f, "ClearNotice"),
        }
    }
}

// Advisory only, never part of the game state
struct RejectedNotice {
    position: Position,
    _timeout: Timeout,
}

pub struct App {
    client: SyncClient<Channel>,
    config: ClientConfig,
    notice: Option<RejectedNotice>,
}

impl Component for App {
    type Message = Message;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = client_config().unwrap_or_else(|err| {
            error!("Falling back to default server: {:?}", err);
            ClientConfig::default()
        });
        let on_event = ctx.link().callback(Message::Transport);
        let channel = ws::connect(config.server_url.clone(), config.reconnect.clone(), on_event);
        Self {
            client: SyncClient::new(channel),
            config,
            notice: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        debug!("update: {}", msg);
        match msg {
            Message::Transport(event) => match self.client.handle(event) {
                Update::Ignored => false,
                Update::Replaced => {
                    self.notice = None;
                    true
                }
                Update::Connection(_) => true,
                Update::Rejected(position) => {
                    let link = ctx.link().clone();
                    let millis = u32::try_from(self.config.rejected_notice.as_millis())
                        .unwrap_or(u32::MAX);
                    self.notice = Some(RejectedNotice {
                        position,
                        _timeout: Timeout::new(millis, move || {
                            link.send_message(Message::ClearNotice)
                        }),
                    });
                    true
                }
            },
            Message::Reset => {
                match self.client.request_reset() {
                    Ok(true) => {}
                    Ok(false) => debug!("Reset ignored while not connected"),
                    Err(err) => warn!("Failed to request reset: {}", err),
                }
                false
            }
            Message::ClearNotice => self.notice.take().is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let state = self.client.state();
        let connection = self.client.connection();
        let onclick_reset = ctx.link().callback(|_| Message::Reset);
        html! {
            <div class={classes!("App")}>
                <header class={classes!("App-header")}>
                    <h1>{"Tic-Tac-Toe"}</h1>
                    <ConnectionIndicator connection={connection} />
                </header>
                <main class={classes!("App-main")}>
                    <TurnIndicator turn={view::turn(state)} />
                    <GameStatus banner={view::banner(state)} />
                    <BoardComponent squares={view::squares(state)} />
                    {
                        match &self.notice {
                            Some(notice) => html! {
                                <div class={classes!("rejected-move")}>
                                    {format!("Move at position {} was rejected", notice.position)}
                                </div>
                            },
                            None => html! {},
                        }
                    }
                    <button
                        class={classes!("reset-button")}
                        onclick={onclick_reset}
                        disabled={!view::can_reset(connection)}>
                        {"Reset Game"}
                    </button>
                    <div class={classes!("instructions")}>
                        <p>{"Press the physical buttons on the Raspberry Pi to make your move!"}</p>
                        <p>{"Player X (Red LED) • Player O (Blue LED)"}</p>
                    </div>
                </main>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.client.shutdown();
    }
}

fn client_config() -> anyhow::Result<ClientConfig> {
    let location = web_sys::window()
        .ok_or_else(|| anyhow!("no window"))?
        .location();
    let protocol = location
        .protocol()
        .map_err(|e| anyhow!("location.protocol: {:?}", e))?;
    let hostname = location
        .hostname()
        .map_err(|e| anyhow!("location.hostname: {:?}", e))?;
    let search = location
        .search()
        .map_err(|e| anyhow!("location.search: {:?}", e))?;
    let server_override = UrlSearchParams::new_with_str(&search)
        .map_err(|e| anyhow!("invalid query string: {:?}", e))?
        .get("server");
    Ok(ClientConfig::from_location(&protocol, &hostname, server_override))
}
