mod app;
mod components;
mod logging;
mod ws;

fn main() {
    logging::init();
    yew::Renderer::<app::App>::new().render();
}
