use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Property keys tried, in order, when looking for a feature's display name.
pub const NAME_KEYS: [&str; 4] = ["name", "NAME", "state", "STATE_NAME"];

/// Name given to features that carry none of [`NAME_KEYS`].
pub const UNKNOWN_REGION: &str = "Unknown";

// --- GeoJSON input ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default, deserialize_with = "lenient_features")]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub geometry: Option<Geometry>,
}

/// A field of the wrong shape decodes as `None` instead of failing the
/// whole collection.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A feature that is not an object keeps its slot as an empty feature.
fn lenient_features<'de, D>(deserializer: D) -> std::result::Result<Vec<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(index = i, error = %e, "feature is not an object");
                Feature::default()
            })
        })
        .collect())
}

/// Coordinates are kept as raw JSON so geometry of any type and nesting depth
/// survives deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

impl Feature {
    /// First non-empty string among [`NAME_KEYS`], else [`UNKNOWN_REGION`].
    pub fn display_name(&self) -> String {
        self.properties
            .as_ref()
            .and_then(|props| {
                NAME_KEYS
                    .iter()
                    .filter_map(|key| props.get(*key).and_then(Value::as_str))
                    .find(|name| !name.is_empty())
            })
            .unwrap_or(UNKNOWN_REGION)
            .to_string()
    }
}

impl Geometry {
    /// Decode into polygons of rings.
    ///
    /// `Polygon` yields one polygon and `MultiPolygon` one per member. Other
    /// geometry types yield an empty shape. `None` means the coordinates did
    /// not have the nesting the type promises.
    pub fn shape(&self) -> Option<RegionShape> {
        match self.kind.as_str() {
            "Polygon" => decode_polygon(&self.coordinates).map(|p| vec![p]),
            "MultiPolygon" => self
                .coordinates
                .as_array()?
                .iter()
                .map(decode_polygon)
                .collect(),
            _ => Some(Vec::new()),
        }
    }
}

fn decode_polygon(value: &Value) -> Option<Polygon> {
    value.as_array()?.iter().map(decode_ring).collect()
}

fn decode_ring(value: &Value) -> Option<Ring> {
    value.as_array()?.iter().map(decode_position).collect()
}

fn decode_position(value: &Value) -> Option<LonLat> {
    let pair = value.as_array()?;
    let lon = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    (lon.is_finite() && lat.is_finite()).then_some(LonLat { lon, lat })
}

// --- Decoded regions ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

pub type Ring = Vec<LonLat>;
pub type Polygon = Vec<Ring>;
pub type RegionShape = Vec<Polygon>;

/// Index of a region in its dataset. Stable for the dataset's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub id: RegionId,
    pub name: String,
    pub shape: RegionShape,
}

/// Per-region interaction state, kept in a side table indexed by [`RegionId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionVisual {
    pub is_selected: bool,
}

// --- Points of interest ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub name: String,
    /// Name of the region this point belongs to.
    pub region: String,
    pub lon: f64,
    pub lat: f64,
    /// 0xRRGGBB
    pub color: u32,
}

impl PointOfInterest {
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: Value) -> Feature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_display_name_prefers_first_key() {
        let f = feature(json!({
            "properties": { "NAME": "Upper", "name": "lower" },
            "geometry": null
        }));
        assert_eq!(f.display_name(), "lower");
    }

    #[test]
    fn test_display_name_falls_back_through_keys() {
        let f = feature(json!({ "properties": { "STATE_NAME": "Ohio" } }));
        assert_eq!(f.display_name(), "Ohio");
    }

    #[test]
    fn test_display_name_skips_empty_and_non_string() {
        let f = feature(json!({ "properties": { "name": "", "NAME": 7, "state": "Iowa" } }));
        assert_eq!(f.display_name(), "Iowa");
    }

    #[test]
    fn test_display_name_unknown() {
        assert_eq!(feature(json!({})).display_name(), UNKNOWN_REGION);
        let f = feature(json!({ "properties": { "abbr": "MA" } }));
        assert_eq!(f.display_name(), UNKNOWN_REGION);
    }

    #[test]
    fn test_polygon_shape() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0]]]
        }))
        .unwrap();
        let shape = g.shape().unwrap();
        assert_eq!(shape.len(), 1);
        assert_eq!(shape[0].len(), 1);
        assert_eq!(shape[0][0].len(), 4);
        assert_eq!(shape[0][0][2], LonLat { lon: 10.0, lat: 10.0 });
    }

    #[test]
    fn test_multipolygon_shape() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [0, 1], [1, 1]]],
                [[[5, 5], [5, 6], [6, 6]], [[5.2, 5.5], [5.4, 5.5], [5.3, 5.8]]]
            ]
        }))
        .unwrap();
        let shape = g.shape().unwrap();
        assert_eq!(shape.len(), 2);
        assert_eq!(shape[1].len(), 2);
    }

    #[test]
    fn test_positions_keep_only_lon_lat() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[1, 2, 300], [3, 4, 300], [5, 6, 300]]]
        }))
        .unwrap();
        let shape = g.shape().unwrap();
        assert_eq!(shape[0][0][1], LonLat { lon: 3.0, lat: 4.0 });
    }

    #[test]
    fn test_other_geometry_types_are_empty() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "LineString",
            "coordinates": [[0, 0], [1, 1]]
        }))
        .unwrap();
        assert_eq!(g.shape(), Some(Vec::new()));
    }

    #[test]
    fn test_malformed_polygon_is_none() {
        let g: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[0, 0], [1, 1]]
        }))
        .unwrap();
        assert!(g.shape().is_none());
    }

    #[test]
    fn test_point_of_interest_json() {
        let json = r#"[{"name":"Boston College","region":"Massachusetts","lon":-71.171,"lat":42.3355,"color":9109504}]"#;
        let points = PointOfInterest::list_from_json(json).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].region, "Massachusetts");
        assert_eq!(points[0].color, 0x8b0000);
    }

    #[test]
    fn test_bad_feature_fields_decode_as_none() {
        let c = FeatureCollection::from_json(
            r#"{"features":[
                {"properties":"oops","geometry":{"coordinates":[[[0,0],[0,1],[1,1]]]}},
                {"properties":{"name":"Typed"},"geometry":{"type":7,"coordinates":[]}},
                42
            ]}"#,
        )
        .unwrap();
        assert_eq!(c.features.len(), 3);
        assert!(c.features[0].properties.is_none());
        assert!(c.features[0].geometry.is_none());
        assert_eq!(c.features[0].display_name(), UNKNOWN_REGION);
        assert_eq!(c.features[1].display_name(), "Typed");
        assert!(c.features[1].geometry.is_none());
        assert!(c.features[2].geometry.is_none());
    }

    #[test]
    fn test_feature_collection_parse_error() {
        assert!(FeatureCollection::from_json("{ not json").is_err());
    }
}
