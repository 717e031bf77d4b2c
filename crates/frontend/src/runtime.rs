//! Drives [`ViewerState`]: every input becomes a [`Msg`], the page's
//! coroutine applies it, and the returned effects are carried out here.

use dioxus::logger::tracing;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use planet_viewer_shared::coordinator::RequestTag;
use planet_viewer_shared::models::SearchOutcome;
use planet_viewer_shared::state::{Effect, ViewerState};
use planet_viewer_shared::timer::{Timer, TimerTicket};
use planet_viewer_shared::viewport::{Bounds, LatLng};
use wasm_bindgen_futures::spawn_local;

use crate::{api, bridge};

pub const RESULTS_CONTAINER_ID: &str = "results-container";

#[derive(Debug, Clone)]
pub enum Msg {
    MapMounted,
    Moved { zoom: u32, bounds: Bounds },
    TileLoading(bool),
    Options { show_satellites: bool, show_images: bool },
    TimerFired(TimerTicket<Timer>),
    Settled(RequestTag, SearchOutcome),
    /// "Load" on the result with this tile template.
    Select(String),
    Clear,
    Opacity(i32),
    SubmitKey(String),
    PlaceSearch(String),
    PlaceFound(Result<Option<LatLng>, String>),
}

pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Apply one message to the state and run what it asks for.
pub fn apply(mut state: Signal<ViewerState>, tx: Coroutine<Msg>, msg: Msg) {
    let effects = {
        let mut s = state.write();
        match msg {
            Msg::MapMounted => s.on_map_mounted(),
            Msg::Moved { zoom, bounds } => s.on_viewport_change(zoom, bounds, now_ms()),
            Msg::TileLoading(loading) => {
                s.on_tile_loading(loading);
                Vec::new()
            }
            Msg::Options {
                show_satellites,
                show_images,
            } => s.set_options(show_satellites, show_images, now_ms()),
            Msg::TimerFired(ticket) => s.on_timer(ticket),
            Msg::Settled(tag, outcome) => s.on_search_settled(tag, outcome),
            Msg::Select(tile_url) => s.select_tile(&tile_url),
            Msg::Clear => s.clear_tile(),
            Msg::Opacity(percent) => s.set_opacity(percent),
            Msg::SubmitKey(key) => s.submit_key(&key, now_ms()),
            Msg::PlaceSearch(text) => s.search_place(&text),
            Msg::PlaceFound(found) => s.on_place_found(found),
        }
    };
    for effect in effects {
        run(state, tx, effect);
    }
}

fn run(state: Signal<ViewerState>, tx: Coroutine<Msg>, effect: Effect) {
    match effect {
        Effect::StartTimer(ticket) => spawn_local(async move {
            TimeoutFuture::new(u32::try_from(ticket.delay_ms).unwrap_or(u32::MAX)).await;
            tx.send(Msg::TimerFired(ticket));
        }),
        Effect::Search(request) => spawn_local(async move {
            tracing::debug!(query = ?request.query, "searching");
            let outcome = api::search(request.query).await;
            tx.send(Msg::Settled(request.tag, outcome));
        }),
        Effect::PostKey(key) => spawn_local(async move {
            if let Err(e) = api::update_key(&key).await {
                tracing::warn!(error = %e, "key update failed");
            }
        }),
        Effect::SetTileUrl(url) => report(bridge::set_tile_url(&url)),
        Effect::SetOpacity(value) => report(bridge::set_opacity(value)),
        Effect::DrawOverlay(overlay) => match serde_json::to_string(&overlay) {
            Ok(json) => report(bridge::set_overlay(&json)),
            Err(e) => tracing::warn!(error = %e, "overlay did not serialize"),
        },
        Effect::ResetScroll => reset_scroll(),
        Effect::Geocode { text, bias } => {
            let endpoint = state.peek().config().geocoder_url.clone();
            spawn_local(async move {
                let found = api::geocode(&endpoint, &text, bias).await;
                tx.send(Msg::PlaceFound(found));
            })
        }
        Effect::SetView { center, zoom } => report(bridge::set_view(center, zoom)),
        Effect::Alert(message) => alert(&message),
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        window.alert_with_message(message).ok();
    }
}

fn report(result: Result<(), wasm_bindgen::JsValue>) {
    if let Err(e) = result {
        tracing::warn!(error = ?e, "map update failed");
    }
}

fn reset_scroll() {
    if let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(RESULTS_CONTAINER_ID))
    {
        el.set_scroll_top(0);
    }
}
