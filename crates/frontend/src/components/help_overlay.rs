use dioxus::prelude::*;

#[component]
pub fn HelpOverlay(show: Signal<bool>) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "help-overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "Help" }

                div { class: "shortcut-section",
                    h3 { "Map" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Click a state" }
                        span { "Select it (click again to clear)" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Scroll / pinch" }
                        span { "Zoom at the cursor" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Drag" }
                        span { "Pan" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Double-click" }
                        span { "Zoom in one step" }
                    }
                }

                div { class: "help-divider" }

                div { class: "help-info-section",
                    h3 { "Schools" }
                    p { "Select a state and zoom in past 2.2\u{00d7} to see its schools. Click a school to show its name in the status bar." }
                }

                button {
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}
