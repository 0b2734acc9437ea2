use std::path::PathBuf;

/// GeoJSON the map draws when `GEOJSON_URL` is not set.
pub const DEFAULT_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/PublicaMundi/MappingAPI/master/data/geojson/us-states.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub assets_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub port: u16,
    pub geojson_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source so tests don't touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid PORT, using 3000");
                3000
            }),
            None => 3000,
        };
        Self {
            assets_dir: PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_string())),
            dist_dir: PathBuf::from(lookup("DIST_DIR").unwrap_or_else(|| "dist".to_string())),
            port,
            geojson_url: lookup("GEOJSON_URL").unwrap_or_else(|| DEFAULT_GEOJSON_URL.to_string()),
        }
    }
}
