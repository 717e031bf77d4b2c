use dioxus::prelude::*;
use planet_viewer_shared::format::{age_label, format_date, format_time};
use planet_viewer_shared::overlay::color_for;
use planet_viewer_shared::state::ViewerState;

use crate::runtime::{self, Msg};

/// What one result card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub index: usize,
    /// Identifies the result when "Load" is clicked.
    pub tile_url: String,
    pub thumb: String,
    pub date: String,
    pub time: String,
    pub age: String,
    /// Track color and label, present when tracks are drawn.
    pub track: Option<(&'static str, String)>,
    pub clear_percent: i32,
    pub loaded: bool,
}

pub fn cards(state: &ViewerState, now_ms: i64) -> Vec<Card> {
    let options = state.options();
    let zone = state.display_zone();
    state
        .results()
        .iter()
        .enumerate()
        .map(|(index, r)| {
            let local = r.acquired.as_ref().map(|ts| zone.localize(ts));
            let acquired = local.as_ref();
            let track = options.show_satellites.then(|| {
                let label = if options.show_images {
                    format!("ID: {}", r.id)
                } else {
                    format!("Satellite: {}", r.satellite_id)
                };
                (color_for(index), label)
            });
            Card {
                index,
                tile_url: r.tile_url.clone(),
                thumb: r.thumb.clone(),
                date: format_date(acquired),
                time: format_time(acquired),
                age: age_label(acquired, now_ms),
                track,
                clear_percent: r.clear_percent,
                loaded: state.is_loaded(r),
            }
        })
        .collect()
}

#[component]
pub fn ResultList(state: Signal<ViewerState>) -> Element {
    let tx = use_coroutine_handle::<Msg>();
    let cards = cards(&state.read(), runtime::now_ms() as i64);

    rsx! {
        div { class: "results",
            for card in cards {
                div { class: "result", key: "{card.index}",
                    div { class: "thumb",
                        img { src: "{card.thumb}" }
                    }
                    div { class: "fullwidth",
                        div { b { "{card.date}" } }
                        div {
                            b { "{card.time}" }
                            " ("
                            i { "{card.age}" }
                            ")"
                        }
                        div { class: "result-lower",
                            div {
                                if let Some((color, label)) = &card.track {
                                    div { class: "track", style: "border-color: {color}", "{label}" }
                                }
                                div {
                                    "Visibility: "
                                    b { "{card.clear_percent}%" }
                                }
                            }
                            button {
                                disabled: card.loaded,
                                onclick: {
                                    let tile_url = card.tile_url.clone();
                                    move |_| tx.send(Msg::Select(tile_url.clone()))
                                },
                                "Load"
                            }
                        }
                    }
                }
            }
        }
    }
}
