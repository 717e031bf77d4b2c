use dioxus::prelude::*;
use planet_viewer_shared::state::ViewerState;

use crate::runtime::Msg;

#[component]
pub fn ErrorPanel(state: Signal<ViewerState>, message: String, is_key_error: bool) -> Element {
    let tx = use_coroutine_handle::<Msg>();
    let mut key_input = use_signal(String::new);
    let mut was_pending = use_signal(|| false);

    let pending = state.read().key_update_pending();

    // The field empties once the retry after a key submission has gone out.
    use_effect(move || {
        let pending = state.read().key_update_pending();
        if *was_pending.peek() && !pending {
            key_input.set(String::new());
        }
        was_pending.set(pending);
    });

    rsx! {
        div { class: "error-container",
            div { class: "error", "Problem Loading Satellite Imagery" }
            div { class: "error-message", "{message}" }
            if is_key_error {
                div { class: "key-help",
                    div { "It looks like we need a new API key! You can help!" }
                    ol {
                        li {
                            "Go to "
                            a { href: "https://www.planet.com/login/", target: "_blank", "https://www.planet.com" }
                            ". Click "
                            em { "Sign Up" }
                            " and create a trial account."
                        }
                        li { "Open " em { "My Account" } }
                        li { "Copy the " em { "API Key" } }
                        li {
                            "Paste it here:"
                            div { class: "key-entry",
                                input {
                                    r#type: "text",
                                    placeholder: "Enter API Key",
                                    value: "{key_input}",
                                    oninput: move |evt: Event<FormData>| {
                                        key_input.set(evt.value().to_string());
                                    },
                                }
                                button {
                                    disabled: pending,
                                    onclick: move |_| tx.send(Msg::SubmitKey(key_input.read().clone())),
                                    "SAVE"
                                }
                                if pending {
                                    span { class: "spinner small" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
