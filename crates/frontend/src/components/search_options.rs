use dioxus::prelude::*;
use planet_viewer_shared::state::ViewerState;

use crate::runtime::Msg;

#[component]
pub fn SearchOptions(state: Signal<ViewerState>) -> Element {
    let tx = use_coroutine_handle::<Msg>();
    let options = state.read().options();

    rsx! {
        div { class: "panel search-options",
            label {
                input {
                    r#type: "checkbox",
                    checked: options.show_satellites,
                    onchange: move |evt: Event<FormData>| {
                        tx.send(Msg::Options {
                            show_satellites: evt.checked(),
                            show_images: options.show_images,
                        });
                    },
                }
                "Show Satellite Tracks"
            }
            // Individual images only make sense on top of satellite tracks.
            label { class: if !options.show_satellites { "disabled" } else { "" },
                input {
                    r#type: "checkbox",
                    checked: options.show_images,
                    disabled: !options.show_satellites,
                    onchange: move |evt: Event<FormData>| {
                        tx.send(Msg::Options {
                            show_satellites: options.show_satellites,
                            show_images: evt.checked(),
                        });
                    },
                }
                "Show Individual Images"
            }
        }
    }
}
