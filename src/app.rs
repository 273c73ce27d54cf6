use leptos::logging::{error, log};
use leptos::*;

use crate::api::{stored_token, Api};
use crate::chat::ChatWidget;
use crate::config::Config;
use crate::weather::{Coord, WeatherWidget};

#[component]
pub fn App() -> impl IntoView {
    let config = Config::from_window();
    let api = match Api::new(&config.api_base) {
        Ok(api) => api,
        Err(err) => {
            error!("bad API base {}: {err}", config.api_base);
            return ().into_view();
        }
    };
    if stored_token().is_none() {
        log!("no session token, widgets stay hidden");
        return ().into_view();
    }
    provide_context(config);
    provide_context(api);

    // route pages push their location here once the visitor picks a spot
    let location = create_rw_signal(None::<Coord>);
    provide_context(location);

    view! {
        <div class="fixed bottom-4 left-4 z-40">
            <WeatherWidget coords=location />
        </div>
        <ChatWidget />
    }
    .into_view()
}
