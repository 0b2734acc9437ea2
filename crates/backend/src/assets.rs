use recruiting_map_shared::geo::Dataset;
use recruiting_map_shared::models::{FeatureCollection, PointOfInterest};
use std::path::{Path, PathBuf};

pub struct Assets {
    pub points: Vec<PointOfInterest>,
    pub geojson_url: String,
    /// Regions of the dataset when it is served from `/static`.
    pub region_names: Option<Vec<String>>,
}

impl Assets {
    pub fn load(assets_dir: &Path, geojson_url: &str) -> Result<Self, String> {
        let points_path = assets_dir.join("points_of_interest.json");
        let points_data = std::fs::read_to_string(&points_path)
            .map_err(|e| format!("Failed to read {}: {}", points_path.display(), e))?;
        let points = PointOfInterest::list_from_json(&points_data)
            .map_err(|e| format!("Failed to parse points_of_interest.json: {}", e))?;

        let region_names = match local_dataset_path(assets_dir, geojson_url) {
            Some(path) => {
                let data = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
                let collection = FeatureCollection::from_json(&data)
                    .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
                let dataset = Dataset::from_collection(&collection);
                Some(dataset.regions.into_iter().map(|r| r.name).collect())
            }
            None => None,
        };

        tracing::info!(
            points = points.len(),
            geojson_url,
            local_regions = region_names.as_ref().map(Vec::len),
            "Loaded map assets"
        );

        Ok(Assets {
            points,
            geojson_url: geojson_url.to_string(),
            region_names,
        })
    }

    pub fn points_in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a PointOfInterest> {
        self.points.iter().filter(move |p| p.region == region)
    }
}

/// `/static/...` URLs are served from the assets directory.
fn local_dataset_path(assets_dir: &Path, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix("/static/")?;
    Some(assets_dir.join(relative))
}
