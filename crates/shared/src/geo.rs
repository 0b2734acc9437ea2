//! Geographic bounds, the equirectangular fit projection, and the decoded
//! region dataset with point-in-region lookup.
//!
//! Screen space here is the map layer's own space: pixels of the container
//! at zoom 1, before the pan/zoom transform is applied.
use serde_json::Value;

use crate::models::{
    FeatureCollection, LonLat, Polygon, RegionFeature, RegionId, RegionShape, Ring,
};

/// Pixels kept clear on every side of the fitted map.
pub const PADDING: f64 = 40.0;

/// Used when a dataset has no finite coordinates at all.
pub const FALLBACK_BOUNDS: GeoBoundsBox = GeoBoundsBox {
    min_lon: -170.0,
    min_lat: 18.0,
    max_lon: -60.0,
    max_lat: 72.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundsBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBoundsBox {
    /// Enclosing box of every coordinate in the collection.
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let mut acc = BoundsAccumulator::default();
        for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
            acc.walk(&geometry.coordinates);
        }
        acc.finish()
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

}

struct BoundsAccumulator {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }
}

impl BoundsAccumulator {
    /// An array starting with a number is a position; any other array nests
    /// further positions.
    fn walk(&mut self, coords: &Value) {
        let Some(items) = coords.as_array() else {
            return;
        };
        match items.first() {
            Some(Value::Number(_)) => {
                let lon = items.first().and_then(Value::as_f64);
                let lat = items.get(1).and_then(Value::as_f64);
                if let (Some(lon), Some(lat)) = (lon, lat) {
                    self.add(lon, lat);
                }
            }
            _ => items.iter().for_each(|item| self.walk(item)),
        }
    }

    fn add(&mut self, lon: f64, lat: f64) {
        if !lon.is_finite() || !lat.is_finite() {
            return;
        }
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
    }

    fn finish(self) -> GeoBoundsBox {
        let all_finite = [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            tracing::debug!("no finite coordinates in dataset, using fallback bounds");
            return FALLBACK_BOUNDS;
        }
        GeoBoundsBox {
            min_lon: self.min_lon,
            min_lat: self.min_lat,
            max_lon: self.max_lon,
            max_lat: self.max_lat,
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Pixels per degree of the fit, shared by both axes.
    pub scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub bounds: GeoBoundsBox,
    pub padding: f64,
}

impl Projector {
    pub fn new(bounds: GeoBoundsBox) -> Self {
        Self {
            bounds,
            padding: PADDING,
        }
    }

    /// Isotropic fit scale: the smaller of the two per-axis scales, so shapes
    /// are never stretched.
    pub fn fit_scale(&self, screen_w: f64, screen_h: f64) -> f64 {
        let plot_w = (screen_w - self.padding * 2.0).max(1.0);
        let plot_h = (screen_h - self.padding * 2.0).max(1.0);
        let scale_x = plot_w / nonzero_span(self.bounds.lon_span());
        let scale_y = plot_h / nonzero_span(self.bounds.lat_span());
        scale_x.min(scale_y)
    }

    pub fn project(&self, lon: f64, lat: f64, screen_w: f64, screen_h: f64) -> Projected {
        let scale = self.fit_scale(screen_w, screen_h);
        Projected {
            x: self.padding + (lon - self.bounds.min_lon) * scale,
            // Screen y grows downward.
            y: self.padding + (self.bounds.max_lat - lat) * scale,
            scale,
        }
    }

    pub fn project_at(&self, point: LonLat, viewport: Viewport) -> Projected {
        self.project(point.lon, point.lat, viewport.width, viewport.height)
    }

    /// Inverse of [`Projector::project`].
    pub fn unproject(&self, x: f64, y: f64, screen_w: f64, screen_h: f64) -> LonLat {
        let scale = self.fit_scale(screen_w, screen_h);
        LonLat {
            lon: self.bounds.min_lon + (x - self.padding) / scale,
            lat: self.bounds.max_lat - (y - self.padding) / scale,
        }
    }
}

fn nonzero_span(span: f64) -> f64 {
    if span > 0.0 {
        span
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub bounds: GeoBoundsBox,
    pub regions: Vec<RegionFeature>,
}

impl Dataset {
    /// Decode every feature. Features with malformed geometry keep their slot
    /// (so ids stay aligned with the collection) but get an empty shape.
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let bounds = GeoBoundsBox::from_collection(collection);
        let regions = collection
            .features
            .iter()
            .enumerate()
            .map(|(i, feature)| {
                let name = feature.display_name();
                let shape: RegionShape = match &feature.geometry {
                    Some(geometry) => geometry.shape().unwrap_or_else(|| {
                        tracing::warn!(region = %name, kind = %geometry.kind, "skipping malformed geometry");
                        Vec::new()
                    }),
                    None => {
                        tracing::warn!(region = %name, "skipping feature without usable geometry");
                        Vec::new()
                    }
                };
                RegionFeature {
                    id: RegionId(i),
                    name,
                    shape,
                }
            })
            .collect::<Vec<_>>();
        tracing::info!(regions = regions.len(), "loaded region dataset");
        Self { bounds, regions }
    }

    pub fn projector(&self) -> Projector {
        Projector::new(self.bounds)
    }

    pub fn region(&self, id: RegionId) -> Option<&RegionFeature> {
        self.regions.get(id.0)
    }

    pub fn name_of(&self, id: RegionId) -> Option<&str> {
        self.region(id).map(|r| r.name.as_str())
    }

    pub fn find_by_name(&self, name: &str) -> Option<RegionId> {
        self.regions.iter().find(|r| r.name == name).map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region under a geographic point. Later regions are drawn on top, so
    /// they win on overlap.
    pub fn region_at(&self, point: LonLat) -> Option<RegionId> {
        self.regions
            .iter()
            .rev()
            .find(|region| region.shape.iter().any(|poly| polygon_contains(poly, point)))
            .map(|region| region.id)
    }
}

/// Inside the outer ring and outside every hole.
pub fn polygon_contains(polygon: &Polygon, point: LonLat) -> bool {
    let Some((outer, holes)) = polygon.split_first() else {
        return false;
    };
    ring_contains(outer, point) && !holes.iter().any(|hole| ring_contains(hole, point))
}

/// Even-odd ray cast. The ring may or may not repeat its first vertex.
pub fn ring_contains(ring: &Ring, point: LonLat) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat)
            && point.lon < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    fn square_collection() -> FeatureCollection {
        collection(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name": "Square" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0]]]
                }
            }]
        }))
    }

    fn ll(lon: f64, lat: f64) -> LonLat {
        LonLat { lon, lat }
    }

    // --- bounds ---

    #[test]
    fn test_bounds_of_square() {
        let b = GeoBoundsBox::from_collection(&square_collection());
        assert_eq!(
            b,
            GeoBoundsBox { min_lon: 0.0, min_lat: 0.0, max_lon: 10.0, max_lat: 10.0 }
        );
    }

    #[test]
    fn test_bounds_walk_multipolygon_and_other_types() {
        let c = collection(json!({
            "features": [
                { "geometry": { "type": "MultiPolygon", "coordinates": [
                    [[[-5, 1], [-4, 2], [-3, 1]]],
                    [[[20, -8], [21, -7], [22, -8]]]
                ]}},
                { "geometry": { "type": "Point", "coordinates": [3, 30] } },
                { "geometry": null }
            ]
        }));
        let b = GeoBoundsBox::from_collection(&c);
        assert_eq!(b.min_lon, -5.0);
        assert_eq!(b.max_lon, 22.0);
        assert_eq!(b.min_lat, -8.0);
        assert_eq!(b.max_lat, 30.0);
    }

    #[test]
    fn test_bounds_fallback_for_empty_collection() {
        let b = GeoBoundsBox::from_collection(&FeatureCollection::default());
        assert_eq!(b, FALLBACK_BOUNDS);
    }

    #[test]
    fn test_bounds_fallback_when_no_numeric_coordinates() {
        let c = collection(json!({
            "features": [{ "geometry": { "type": "Polygon", "coordinates": [[["a", "b"]]] } }]
        }));
        assert_eq!(GeoBoundsBox::from_collection(&c), FALLBACK_BOUNDS);
    }

    // --- projection ---

    #[test]
    fn test_square_projects_to_expected_corners() {
        let p = Projector::new(GeoBoundsBox::from_collection(&square_collection()));
        let top_left = p.project(0.0, 10.0, 100.0, 100.0);
        let bottom_right = p.project(10.0, 0.0, 100.0, 100.0);
        assert!((top_left.scale - 2.0).abs() < 1e-9);
        assert!((top_left.x - 40.0).abs() < 1e-9);
        assert!((top_left.y - 40.0).abs() < 1e-9);
        assert!((bottom_right.x - 60.0).abs() < 1e-9);
        assert!((bottom_right.y - 60.0).abs() < 1e-9);
        let origin = p.project(0.0, 0.0, 100.0, 100.0);
        assert!((origin.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_is_isotropic() {
        // Wide viewport: latitude axis limits the scale.
        let p = Projector::new(GeoBoundsBox { min_lon: 0.0, min_lat: 0.0, max_lon: 10.0, max_lat: 10.0 });
        let a = p.project(0.0, 0.0, 1080.0, 180.0);
        assert!((a.scale - 10.0).abs() < 1e-9);
        let b = p.project(10.0, 0.0, 1080.0, 180.0);
        assert!((b.x - a.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_stays_in_viewport() {
        let p = Projector::new(FALLBACK_BOUNDS);
        for &(w, h) in &[(1.0, 1.0), (50.0, 30.0), (80.0, 80.0), (800.0, 600.0), (1920.0, 400.0)] {
            for &(lon, lat) in &[(-170.0, 18.0), (-60.0, 72.0), (-100.0, 40.0), (-170.0, 72.0)] {
                let pt = p.project(lon, lat, w, h);
                let max_x = w.max(2.0 * PADDING + 1.0);
                let max_y = h.max(2.0 * PADDING + 1.0);
                assert!(pt.x >= 0.0 && pt.x <= max_x, "x={} for {}x{}", pt.x, w, h);
                assert!(pt.y >= 0.0 && pt.y <= max_y, "y={} for {}x{}", pt.y, w, h);
            }
        }
    }

    #[test]
    fn test_projection_degenerate_viewport_is_finite() {
        let p = Projector::new(FALLBACK_BOUNDS);
        let pt = p.project(-100.0, 40.0, 0.0, 0.0);
        assert!(pt.x.is_finite() && pt.y.is_finite() && pt.scale > 0.0);
    }

    #[test]
    fn test_projection_zero_span_is_finite() {
        let b = GeoBoundsBox { min_lon: 5.0, min_lat: 5.0, max_lon: 5.0, max_lat: 5.0 };
        let pt = Projector::new(b).project(5.0, 5.0, 200.0, 200.0);
        assert!(pt.scale.is_finite());
        assert!((pt.x - PADDING).abs() < 1e-9);
    }

    #[test]
    fn test_projection_is_pure() {
        let p = Projector::new(FALLBACK_BOUNDS);
        assert_eq!(p.project(-71.0, 42.0, 800.0, 600.0), p.project(-71.0, 42.0, 800.0, 600.0));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let p = Projector::new(FALLBACK_BOUNDS);
        let pt = p.project(-71.171, 42.3355, 1280.0, 720.0);
        let back = p.unproject(pt.x, pt.y, 1280.0, 720.0);
        assert!((back.lon - -71.171).abs() < 1e-9);
        assert!((back.lat - 42.3355).abs() < 1e-9);
    }

    // --- dataset & hit testing ---

    #[test]
    fn test_dataset_keeps_ids_aligned_with_features() {
        let c = collection(json!({
            "features": [
                { "properties": { "name": "Broken" }, "geometry": { "type": "Polygon", "coordinates": [1, 2] } },
                { "properties": { "name": "Square" }, "geometry": {
                    "type": "Polygon", "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0]]] } }
            ]
        }));
        let ds = Dataset::from_collection(&c);
        assert_eq!(ds.len(), 2);
        assert!(ds.regions[0].shape.is_empty());
        assert_eq!(ds.find_by_name("Square"), Some(RegionId(1)));
        assert_eq!(ds.region_at(ll(5.0, 5.0)), Some(RegionId(1)));
    }

    #[test]
    fn test_malformed_features_do_not_abort_the_dataset() {
        let c = FeatureCollection::from_json(
            r#"{"features":[
                {"properties":{"name":"Square"},"geometry":{"type":"Polygon","coordinates":[[[0,0],[0,10],[10,10],[10,0]]]}},
                {"properties":{"name":"NoType"},"geometry":{"coordinates":[[[20,20],[20,30],[30,30]]]}},
                {"properties":"oops","geometry":{"type":"Polygon","coordinates":[[[40,40],[40,50],[50,50]]]}}
            ]}"#,
        )
        .unwrap();
        let ds = Dataset::from_collection(&c);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.region_at(ll(5.0, 5.0)), Some(RegionId(0)));
        assert!(ds.regions[1].shape.is_empty());
        assert_eq!(ds.regions[2].name, "Unknown");
        assert_eq!(ds.region_at(ll(45.0, 48.0)), Some(RegionId(2)));
    }

    #[test]
    fn test_region_at_respects_holes() {
        let c = collection(json!({
            "features": [{ "properties": { "name": "Donut" }, "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]],
                    [[4, 4], [4, 6], [6, 6], [6, 4], [4, 4]]
                ]
            }}]
        }));
        let ds = Dataset::from_collection(&c);
        assert_eq!(ds.region_at(ll(2.0, 2.0)), Some(RegionId(0)));
        assert_eq!(ds.region_at(ll(5.0, 5.0)), None);
        assert_eq!(ds.region_at(ll(11.0, 5.0)), None);
    }

    #[test]
    fn test_region_at_prefers_topmost() {
        let square = json!([[[0, 0], [0, 10], [10, 10], [10, 0]]]);
        let c = collection(json!({
            "features": [
                { "properties": { "name": "Below" }, "geometry": { "type": "Polygon", "coordinates": square } },
                { "properties": { "name": "Above" }, "geometry": { "type": "Polygon", "coordinates": square } }
            ]
        }));
        let ds = Dataset::from_collection(&c);
        assert_eq!(ds.region_at(ll(5.0, 5.0)), ds.find_by_name("Above"));
    }

    #[test]
    fn test_ring_contains_degenerate_ring() {
        assert!(!ring_contains(&vec![ll(0.0, 0.0), ll(1.0, 1.0)], ll(0.5, 0.5)));
        assert!(!polygon_contains(&Vec::new(), ll(0.5, 0.5)));
    }
}
