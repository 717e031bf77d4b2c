use dioxus::logger::tracing;
use dioxus::prelude::*;
use futures_util::StreamExt;
use gloo_timers::future::TimeoutFuture;
use planet_viewer_shared::state::ViewerState;

use crate::api;
use crate::bridge::{self, MAP_CONTAINER_ID};
use crate::components::error_panel::ErrorPanel;
use crate::components::place_search::PlaceSearch;
use crate::components::result_list::ResultList;
use crate::components::search_options::SearchOptions;
use crate::components::tile_panel::TilePanel;
use crate::runtime::{self, Msg, RESULTS_CONTAINER_ID};

/// How long to wait for the Leaflet script before giving up.
const LEAFLET_WAIT_STEPS: u32 = 100;
const LEAFLET_WAIT_MS: u32 = 100;

#[component]
pub fn Viewer() -> Element {
    let mut state = use_signal(ViewerState::default);

    // Every state change goes through this loop.
    use_coroutine(move |mut rx: UnboundedReceiver<Msg>| async move {
        let tx = consume_context::<Coroutine<Msg>>();

        let config = api::fetch_config().await;
        state.set(ViewerState::new(config.clone()));

        let mut waited = 0;
        while !bridge::leaflet_ready() && waited < LEAFLET_WAIT_STEPS {
            TimeoutFuture::new(LEAFLET_WAIT_MS).await;
            waited += 1;
        }
        let mounted = bridge::init_map(
            &config,
            move |zoom, bounds| tx.send(Msg::Moved { zoom, bounds }),
            move |loading| tx.send(Msg::TileLoading(loading)),
        );
        match mounted {
            Ok(()) => runtime::apply(state, tx, Msg::MapMounted),
            Err(e) => tracing::error!(error = ?e, "map failed to start"),
        }

        while let Some(msg) = rx.next().await {
            runtime::apply(state, tx, msg);
        }
    });

    let s = state.read();
    let loading = s.is_loading();
    let map_loading = s.map_loading();
    let failure = s.failure().cloned();
    drop(s);

    rsx! {
        div { class: "app",
            div { class: "sidebar",
                div { class: "header",
                    h1 { "Planet Data Viewer" }
                }
                div { class: "panel share",
                    b { "Please Share with Care" }
                    div {
                        "This site is a hobby project. Excessive usage leads to server costs which will lead to lockdown. "
                        "All data presented is owned by "
                        a { href: "https://www.planet.com/terms-of-use/", target: "_blank", "© Planet Labs" }
                        "."
                    }
                }

                TilePanel { state: state }
                SearchOptions { state: state }

                div { id: RESULTS_CONTAINER_ID, class: "results-container",
                    if loading {
                        div { class: "loading",
                            div { class: "spinner" }
                        }
                    }
                    ResultList { state: state }
                    if let Some(failure) = failure {
                        ErrorPanel {
                            state: state,
                            message: failure.message,
                            is_key_error: failure.is_key_error,
                        }
                    }
                }
            }

            div { class: "map-wrap",
                div { id: MAP_CONTAINER_ID, class: "map" }
                PlaceSearch {}
                if let Some(what) = map_loading {
                    div { class: "map-loading",
                        "Loading {what}..."
                        span { class: "spinner small" }
                    }
                }
            }
        }
    }
}
