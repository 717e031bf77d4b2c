use dioxus::logger::tracing;
use dioxus::prelude::*;
use planet_viewer_shared::state::ViewerState;

use crate::runtime::Msg;

/// Open the CalTopo export for the loaded tile in a new tab.
fn open_export(state: Signal<ViewerState>) {
    let link = match state.read().export_link() {
        Ok(link) => link,
        Err(e) => {
            tracing::warn!(error = %e, "export requested without a tile");
            return;
        }
    };
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.open_with_url_and_target(&link, "_blank") {
            tracing::warn!(error = ?e, "could not open export link");
        }
    }
}

#[component]
pub fn TilePanel(state: Signal<ViewerState>) -> Element {
    let tx = use_coroutine_handle::<Msg>();

    let s = state.read();
    let active = s.active_tile().clone();
    let opacity = s.opacity().percent();
    let can_export = s.can_export();
    drop(s);

    if !active.is_active() {
        return rsx! {};
    }

    rsx! {
        div { class: "panel currently-showing",
            div { "Currently Viewing:" }
            div { b { "{active.name}" } }
            div { class: "buttons",
                button {
                    onclick: move |_| tx.send(Msg::Clear),
                    "Clear"
                }
                button {
                    class: "secondary",
                    disabled: !can_export,
                    onclick: move |_| open_export(state),
                    "CalTopo"
                }
            }
            div { class: "opacity",
                div { "Opacity ({opacity}%)" }
                input {
                    r#type: "range",
                    min: "0",
                    max: "100",
                    value: "{opacity}",
                    oninput: move |evt: Event<FormData>| {
                        if let Ok(v) = evt.value().parse::<i32>() {
                            tx.send(Msg::Opacity(v));
                        }
                    },
                }
            }
        }
    }
}
