mod api;
mod app;
mod bus;
mod chat;
mod config;
mod conversation;
mod loading;
mod message;
mod nav;
mod state;
mod unread;
mod weather;

use app::*;
use leptos::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| {
        view! { <App /> }
    })
}
