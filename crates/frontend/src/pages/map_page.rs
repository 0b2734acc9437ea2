use dioxus::logger::tracing;
use dioxus::prelude::*;
use recruiting_map_shared::interaction::DEFAULT_PROMPT;

use crate::api;
use crate::components::help_overlay::HelpOverlay;
use crate::components::map_view::MapView;

#[component]
pub fn MapPage() -> Element {
    let data = use_resource(|| async {
        let result = api::load_map_data().await;
        match &result {
            Ok(d) => tracing::info!(
                regions = d.dataset.len(),
                points = d.points.len(),
                "map data loaded"
            ),
            Err(e) => tracing::error!(error = %e, "failed to load map data"),
        }
        result
    });

    let mut status = use_signal(|| DEFAULT_PROMPT.to_string());
    let mut show_help = use_signal(|| false);
    let mut reset_view_counter = use_signal(|| 0u64);

    let body = match &*data.read() {
        Some(Ok(d)) => rsx! {
            MapView {
                key: "{d.dataset.len()}-{d.points.len()}",
                dataset: d.dataset.clone(),
                points: d.points.clone(),
                status: status,
                reset_view_counter: reset_view_counter,
            }
        },
        Some(Err(_)) => rsx! {
            div { class: "map-container inert",
                p { class: "map-note", "Map data unavailable" }
            }
        },
        None => rsx! {
            div { class: "map-container inert" }
        },
    };

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "NCAA Recruiting Map" }
                span { class: "subtitle", "Select a state, zoom in to see its schools" }
                div { class: "header-actions",
                    button {
                        onclick: move |_| *reset_view_counter.write() += 1,
                        "Reset view"
                    }
                    button {
                        onclick: move |_| show_help.set(true),
                        "Help"
                    }
                }
            }

            div { class: "map-panel",
                {body}
                div { class: "status-label", "{status}" }
            }

            HelpOverlay { show: show_help }
        }
    }
}
