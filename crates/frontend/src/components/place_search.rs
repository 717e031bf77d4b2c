use dioxus::prelude::*;

use crate::runtime::Msg;

/// Search box over the map. Submits when the field is committed (Enter or
/// leaving it).
#[component]
pub fn PlaceSearch() -> Element {
    let tx = use_coroutine_handle::<Msg>();

    rsx! {
        div { class: "map-search",
            input {
                r#type: "search",
                placeholder: "Search for Location or Feature",
                onchange: move |evt: Event<FormData>| tx.send(Msg::PlaceSearch(evt.value())),
            }
        }
    }
}
