use common::view::{self, Banner, SquareView};
use common::{ConnectionState, Mark, BOARD_SIZE};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BoardProps {
    pub squares: [SquareView; BOARD_SIZE],
}

#[derive(Properties, PartialEq)]
pub struct SquareProps {
    pub square: SquareView,
}

#[derive(Properties, PartialEq)]
pub struct GameStatusProps {
    pub banner: Option<Banner>,
}

#[derive(Properties, PartialEq)]
pub struct TurnIndicatorProps {
    pub turn: Option<Mark>,
}

#[derive(Properties, PartialEq)]
pub struct ConnectionIndicatorProps {
    pub connection: ConnectionState,
}

#[function_component(BoardComponent)]
pub fn board(props: &BoardProps) -> Html {
    html! {
        <div class={classes!("game-board")}>
            {
                props.squares.iter().map(|square| html! {
                    <SquareComponent square={*square} />
                }).collect::<Html>()
            }
        </div>
    }
}

#[function_component(SquareComponent)]
pub fn square(props: &SquareProps) -> Html {
    let square = props.square;
    let mut class = classes!("square");
    if square.is_winning {
        class.push("winning");
    }
    if square.mark.is_some() {
        class.push("filled");
    }
    html! {
        <div {class}>
            {
                match square.mark {
                    Some(mark) => html! {
                        <span class={classes!("symbol", get_mark_class(mark))}>
                            {mark.to_string()}
                        </span>
                    },
                    None => html! {},
                }
            }
        </div>
    }
}

#[function_component(GameStatus)]
pub fn game_status(props: &GameStatusProps) -> Html {
    let banner = match props.banner {
        Some(banner) => banner,
        None => return html! {},
    };
    let (status_class, title_class) = match banner {
        Banner::Winner(mark) => ("winner", classes!("winner-text", get_mark_class(mark))),
        Banner::Draw => ("draw", Classes::new()),
    };
    html! {
        <div class={classes!("game-status", status_class)}>
            <h2 class={title_class}>{banner.title()}</h2>
            <p>{banner.subtitle()}</p>
        </div>
    }
}

#[function_component(TurnIndicator)]
pub fn turn_indicator(props: &TurnIndicatorProps) -> Html {
    let turn = match props.turn {
        Some(turn) => turn,
        None => return html! {},
    };
    html! {
        <div class={classes!("turn-indicator")}>
            {indicator_light(Mark::X, turn)}
            {indicator_light(Mark::O, turn)}
        </div>
    }
}

fn indicator_light(mark: Mark, turn: Mark) -> Html {
    let mut class = classes!("indicator-light", format!("{}-light", get_mark_class(mark)));
    if mark == turn {
        class.push("active");
    }
    html! {
        <div {class}>
            <span class={classes!("led-icon")}>{"●"}</span>
            <span>{format!("Player {}", mark)}</span>
        </div>
    }
}

#[function_component(ConnectionIndicator)]
pub fn connection_indicator(props: &ConnectionIndicatorProps) -> Html {
    html! {
        <div class={classes!("connection-status", get_connection_class(props.connection))}>
            {view::connection_label(props.connection)}
        </div>
    }
}

fn get_mark_class(mark: Mark) -> String {
    match mark {
        Mark::X => "player-x".to_string(),
        Mark::O => "player-o".to_string(),
    }
}

fn get_connection_class(connection: ConnectionState) -> String {
    match connection {
        ConnectionState::Connected => "connected".to_string(),
        ConnectionState::Connecting => "connecting".to_string(),
        ConnectionState::Disconnected => "disconnected".to_string(),
    }
}
