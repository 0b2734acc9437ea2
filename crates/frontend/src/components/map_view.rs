use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::logger::tracing;
use dioxus::prelude::*;
use recruiting_map_shared::geo::{Dataset, Viewport};
use recruiting_map_shared::interaction::InteractionCoordinator;
use recruiting_map_shared::models::{PointOfInterest, RegionId};
use recruiting_map_shared::scene::{self, SceneInput};
use recruiting_map_shared::viewport::{ViewportController, ViewportTransform};

use crate::coords;

const MAP_CONTAINER_ID: &str = "recruiting-map-container";

/// Mouse movement below this many pixels is a click, not a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch drag threshold in pixels.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

// ---------------------------------------------------------------------------
// Pointer math (pure functions, easily testable)
// ---------------------------------------------------------------------------

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// What sits under a container-relative pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Hit {
    Marker(usize),
    Region(RegionId),
    Nothing,
}

/// Resolve a container-relative point. Visible markers are drawn above the
/// regions, so they win.
fn hit_test(
    dataset: &Dataset,
    points: &[PointOfInterest],
    interaction: &InteractionCoordinator,
    viewport: Viewport,
    transform: ViewportTransform,
    screen_x: f64,
    screen_y: f64,
) -> Hit {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Hit::Nothing;
    }
    let (layer_x, layer_y) = transform.to_world(screen_x, screen_y);
    let projector = dataset.projector();

    let visible = interaction.visible_markers(points, transform.scale, dataset);
    if let Some(i) = scene::marker_at(
        points,
        &visible,
        &projector,
        viewport,
        transform.scale,
        layer_x,
        layer_y,
    ) {
        return Hit::Marker(i);
    }

    let lon_lat = projector.unproject(layer_x, layer_y, viewport.width, viewport.height);
    match dataset.region_at(lon_lat) {
        Some(id) => Hit::Region(id),
        None => Hit::Nothing,
    }
}

/// Offset for a drag that started at `start` with the view at `start_offset`.
fn drag_offset(start_offset: (f64, f64), start: (f64, f64), current: (f64, f64)) -> (f64, f64) {
    (
        start_offset.0 + current.0 - start.0,
        start_offset.1 + current.1 - start.1,
    )
}

fn container_class(dragging: bool, over_target: bool) -> &'static str {
    if dragging {
        "map-container dragging"
    } else if over_target {
        "map-container over-target"
    } else {
        "map-container"
    }
}

/// Move hover state to `hit`, writing the signal only when something changed.
fn apply_hover(interaction: &mut Signal<InteractionCoordinator>, hit: Hit) {
    let (region, marker) = match hit {
        Hit::Marker(i) => (None, Some(i)),
        Hit::Region(id) => (Some(id), None),
        Hit::Nothing => (None, None),
    };
    let unchanged = {
        let ic = interaction.peek();
        ic.hovered() == region && ic.hovered_marker() == marker
    };
    if unchanged {
        return;
    }
    let mut ic = interaction.write();
    ic.set_hover(region);
    match marker {
        Some(i) => {
            ic.marker_enter(i);
        }
        None => {
            ic.marker_leave();
        }
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    dataset: Dataset,
    points: Vec<PointOfInterest>,
    status: Signal<String>,
    reset_view_counter: Signal<u64>,
) -> Element {
    let mut status = status;
    // Inputs are fixed for the lifetime of the view; the page re-keys it on new data
    let dataset = use_signal(|| dataset);
    let points = use_signal(|| points);

    let mut controller = use_signal(ViewportController::default);
    let mut interaction = use_signal(|| InteractionCoordinator::for_dataset(&dataset.peek()));
    let mut size = use_signal(|| Viewport::new(0.0, 0.0));

    use_effect(move || {
        status.set(interaction.peek().status().to_string());
    });

    // Reset zoom/pan when parent signals via reset_view_counter
    use_effect(move || {
        let _counter = *reset_view_counter.read();
        controller.write().reset();
    });

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_offset = use_signal(|| (0.0_f64, 0.0_f64));

    // Touch state
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_start_offset = use_signal(|| (0.0_f64, 0.0_f64));
    let mut touch_did_pan = use_signal(|| false);
    let mut is_pinching = use_signal(|| false);
    let mut pinch_last_distance = use_signal(|| 0.0_f64);

    // Scale on its own so panning does not invalidate the SVG memo
    let zoom = use_memo(move || controller.read().scale());

    // SVG rebuilds on data, hover/selection, size or scale changes. Pan only
    // touches the CSS transform, read outside this memo.
    let svg_html = use_memo(move || {
        let ds = dataset.read();
        let pts = points.read();
        let ic = interaction.read();
        let zoom = *zoom.read();
        scene::build_scene(&SceneInput {
            dataset: &ds,
            points: &pts,
            interaction: &ic,
            viewport: *size.read(),
            zoom,
        })
    });

    let hit_at = move |screen_x: f64, screen_y: f64| -> Hit {
        hit_test(
            &dataset.peek(),
            &points.peek(),
            &interaction.peek(),
            *size.peek(),
            controller.peek().transform(),
            screen_x,
            screen_y,
        )
    };

    // Resolve a tap at a container-relative point and publish the status text
    let mut tap_at = move |screen_x: f64, screen_y: f64| {
        match hit_at(screen_x, screen_y) {
            Hit::Marker(i) => {
                let Some(point) = points.peek().get(i).cloned() else {
                    return;
                };
                tracing::debug!(school = %point.name, "marker tapped");
                interaction.write().marker_tap(&point);
            }
            Hit::Region(id) => {
                let change = interaction.write().tap(id, &dataset.peek());
                tracing::debug!(?change, "region tapped");
            }
            Hit::Nothing => return,
        }
        status.set(interaction.peek().status().to_string());
    };

    let transform_style = controller.read().transform().css();
    let over_target = {
        let ic = interaction.read();
        ic.hovered().is_some() || ic.hovered_marker().is_some()
    };
    let class = container_class(*is_dragging.read() && *did_drag.read(), over_target);

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{class}",

            onmounted: move |_| {
                if let Some(rect) = coords::container_rect(MAP_CONTAINER_ID) {
                    size.set(Viewport::new(rect.width(), rect.height()));
                }
            },

            onresize: move |evt: Event<ResizeData>| {
                if let Ok(content) = evt.data().get_content_box_size() {
                    let next = Viewport::new(content.width, content.height);
                    if *size.peek() != next {
                        tracing::debug!(width = next.width, height = next.height, "map resized");
                        size.set(next);
                    }
                }
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();

                let delta_y = wheel_delta_y(evt.data().delta());
                let pinch = evt.data().modifiers().ctrl();
                let client = evt.data().client_coordinates();
                let Some((cx, cy)) = coords::client_to_element(client.x, client.y, MAP_CONTAINER_ID) else {
                    return;
                };

                let factor = controller.peek().zoom_config().wheel_factor(delta_y, pinch);
                let mut next = *controller.peek();
                if next.zoom_at_point(cx, cy, factor) {
                    controller.set(next);
                }
            },

            onmousedown: move |evt: Event<MouseData>| {
                // Only track drag/click for left mouse button
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                let t = controller.peek().transform();
                drag_start_offset.set((t.offset_x, t.offset_y));
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();

                if *is_dragging.peek() {
                    let start = *drag_start.peek();
                    let dx = client.x - start.0;
                    let dy = client.y - start.1;
                    if !*did_drag.peek() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                        did_drag.set(true);
                    }
                    if *did_drag.peek() {
                        let (x, y) = drag_offset(*drag_start_offset.peek(), start, (client.x, client.y));
                        controller.write().pan_to(x, y);
                        return;
                    }
                }

                if let Some((cx, cy)) = coords::client_to_element(client.x, client.y, MAP_CONTAINER_ID) {
                    apply_hover(&mut interaction, hit_at(cx, cy));
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.peek();
                let was_drag = *did_drag.peek();
                is_dragging.set(false);
                did_drag.set(false);

                // A mouseup without drag movement = a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    if let Some((cx, cy)) = coords::client_to_element(client.x, client.y, MAP_CONTAINER_ID) {
                        tap_at(cx, cy);
                    }
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
                did_drag.set(false);
                apply_hover(&mut interaction, Hit::Nothing);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                let client = evt.client_coordinates();
                let Some((cx, cy)) = coords::client_to_element(client.x, client.y, MAP_CONTAINER_ID) else {
                    return;
                };
                let mut next = *controller.peek();
                let step = next.zoom_config().step_wheel;
                if next.zoom_at_point(cx, cy, step) {
                    controller.set(next);
                }
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    // Single finger: record start position for tap detection and panning
                    let t = &touches[0];
                    let p = (t.client_coordinates().x, t.client_coordinates().y);
                    touch_start_pos.set(Some(p));
                    let view = controller.peek().transform();
                    touch_start_offset.set((view.offset_x, view.offset_y));
                    touch_did_pan.set(false);
                } else if touches.len() >= 2 {
                    // Two fingers: start pinch-to-zoom
                    let p0 = (touches[0].client_coordinates().x, touches[0].client_coordinates().y);
                    let p1 = (touches[1].client_coordinates().x, touches[1].client_coordinates().y);
                    is_pinching.set(true);
                    pinch_last_distance.set(coords::point_distance(p0, p1));
                    // Cancel any tap tracking
                    touch_start_pos.set(None);
                    touch_did_pan.set(true);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();

                if *is_pinching.peek() && touches.len() >= 2 {
                    let p0 = (touches[0].client_coordinates().x, touches[0].client_coordinates().y);
                    let p1 = (touches[1].client_coordinates().x, touches[1].client_coordinates().y);
                    let d = coords::point_distance(p0, p1);
                    let last_d = *pinch_last_distance.peek();
                    if last_d < 1.0 {
                        return;
                    }

                    // Zoom centered on the pinch midpoint
                    let mid = coords::midpoint(p0, p1);
                    let Some((cx, cy)) = coords::client_to_element(mid.0, mid.1, MAP_CONTAINER_ID) else {
                        return;
                    };
                    let mut next = *controller.peek();
                    if next.zoom_at_point(cx, cy, d / last_d) {
                        controller.set(next);
                    }
                    pinch_last_distance.set(d);
                } else if touches.len() == 1 {
                    // Single finger pan
                    let t = &touches[0];
                    let cur = (t.client_coordinates().x, t.client_coordinates().y);
                    if let Some(start) = *touch_start_pos.peek() {
                        if !*touch_did_pan.peek() && coords::point_distance(start, cur) > TOUCH_DRAG_THRESHOLD {
                            touch_did_pan.set(true);
                        }
                        if *touch_did_pan.peek() {
                            let (x, y) = drag_offset(*touch_start_offset.peek(), start, cur);
                            controller.write().pan_to(x, y);
                        }
                    }
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = evt.data().touches().len();

                if *is_pinching.peek() {
                    // Wait for all fingers to lift before resetting pinch state
                    if remaining == 0 {
                        is_pinching.set(false);
                        touch_start_pos.set(None);
                    }
                    return;
                }

                // Single-finger tap: if no pan occurred and all fingers are up, treat as tap
                if remaining == 0 && !*touch_did_pan.peek() {
                    if let Some(start) = *touch_start_pos.peek() {
                        if let Some((cx, cy)) = coords::client_to_element(start.0, start.1, MAP_CONTAINER_ID) {
                            tap_at(cx, cy);
                        }
                    }
                }

                if remaining == 0 {
                    touch_start_pos.set(None);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                // Reset all touch state
                touch_start_pos.set(None);
                touch_did_pan.set(false);
                is_pinching.set(false);
            },

            // CSS transform applies zoom/pan to the whole layer
            div {
                class: "map-inner",
                style: "{transform_style}",
                dangerous_inner_html: "{svg_html}",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recruiting_map_shared::models::FeatureCollection;
    use serde_json::json;

    fn square_dataset() -> Dataset {
        let fc: FeatureCollection = serde_json::from_value(json!({
            "features": [
                { "properties": { "name": "Square" }, "geometry": {
                    "type": "Polygon", "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0]]] } }
            ]
        }))
        .unwrap();
        Dataset::from_collection(&fc)
    }

    fn center_school() -> Vec<PointOfInterest> {
        vec![PointOfInterest {
            name: "Square State".into(),
            region: "Square".into(),
            lon: 5.0,
            lat: 5.0,
            color: 0x8b0000,
        }]
    }

    fn transform(scale: f64) -> ViewportTransform {
        ViewportTransform {
            offset_x: 0.0,
            offset_y: 0.0,
            scale,
        }
    }

    // --- wheel_delta_y tests ---

    #[test]
    fn test_wheel_delta_units() {
        assert!((wheel_delta_y(WheelDelta::pixels(0.0, -120.0, 0.0)) + 120.0).abs() < 1e-9);
        assert!((wheel_delta_y(WheelDelta::lines(0.0, 3.0, 0.0)) - 120.0).abs() < 1e-9);
        assert!((wheel_delta_y(WheelDelta::pages(0.0, 1.0, 0.0)) - 400.0).abs() < 1e-9);
    }

    // --- hit_test tests ---

    #[test]
    fn test_hit_region_in_square() {
        let ds = square_dataset();
        let ic = InteractionCoordinator::for_dataset(&ds);
        let vp = Viewport::new(100.0, 100.0);
        assert_eq!(
            hit_test(&ds, &[], &ic, vp, transform(1.0), 50.0, 50.0),
            Hit::Region(RegionId(0))
        );
        assert_eq!(hit_test(&ds, &[], &ic, vp, transform(1.0), 10.0, 10.0), Hit::Nothing);
    }

    #[test]
    fn test_hit_undoes_zoom() {
        let ds = square_dataset();
        let ic = InteractionCoordinator::for_dataset(&ds);
        let vp = Viewport::new(100.0, 100.0);
        // At scale 2 the square spans 80..120 on screen
        assert_eq!(
            hit_test(&ds, &[], &ic, vp, transform(2.0), 100.0, 100.0),
            Hit::Region(RegionId(0))
        );
        assert_eq!(hit_test(&ds, &[], &ic, vp, transform(2.0), 50.0, 50.0), Hit::Nothing);
    }

    #[test]
    fn test_hit_zero_viewport_is_nothing() {
        let ds = square_dataset();
        let ic = InteractionCoordinator::for_dataset(&ds);
        assert_eq!(
            hit_test(&ds, &[], &ic, Viewport::new(0.0, 0.0), transform(1.0), 0.0, 0.0),
            Hit::Nothing
        );
    }

    #[test]
    fn test_visible_marker_wins_over_region() {
        let ds = square_dataset();
        let points = center_school();
        let mut ic = InteractionCoordinator::for_dataset(&ds);
        let vp = Viewport::new(100.0, 100.0);

        // Hidden until the region is selected and the map is zoomed in
        assert_eq!(
            hit_test(&ds, &points, &ic, vp, transform(3.0), 150.0, 147.0),
            Hit::Region(RegionId(0))
        );
        ic.tap(RegionId(0), &ds);
        assert_eq!(
            hit_test(&ds, &points, &ic, vp, transform(3.0), 150.0, 147.0),
            Hit::Marker(0)
        );
        assert_eq!(
            hit_test(&ds, &points, &ic, vp, transform(1.0), 50.0, 49.0),
            Hit::Region(RegionId(0))
        );
    }

    // --- drag_offset tests ---

    #[test]
    fn test_drag_offset_is_relative_to_start() {
        let (x, y) = drag_offset((10.0, -20.0), (100.0, 100.0), (130.0, 90.0));
        assert!((x - 40.0).abs() < 1e-9);
        assert!((y + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_through_controller_stays_bounded() {
        let mut vc = ViewportController::default();
        let (x, y) = drag_offset((0.0, 0.0), (0.0, 0.0), (500.0, -350.0));
        vc.pan_to(x, y);
        let t = vc.transform();
        assert!((t.offset_x - 200.0).abs() < 1e-9);
        assert!((t.offset_y + 200.0).abs() < 1e-9);
    }

    // --- container_class tests ---

    #[test]
    fn test_container_class() {
        assert_eq!(container_class(false, false), "map-container");
        assert_eq!(container_class(false, true), "map-container over-target");
        assert_eq!(container_class(true, true), "map-container dragging");
    }
}
