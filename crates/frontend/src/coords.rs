/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Bounding client rect of the element with `id`.
pub fn container_rect(id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    Some(element.get_bounding_client_rect())
}

/// Client coordinates relative to the top-left corner of element `id`.
pub fn client_to_element(client_x: f64, client_y: f64, id: &str) -> Option<(f64, f64)> {
    let rect = container_rect(id)?;
    Some(client_to_container(client_x, client_y, rect.left(), rect.top()))
}

/// Distance between two client-coordinate points (touch thresholds, pinch).
pub fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

pub fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
