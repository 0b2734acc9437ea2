use dioxus::logger::tracing;
use recruiting_map_shared::geo::Dataset;
use recruiting_map_shared::models::{FeatureCollection, PointOfInterest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn origin() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    window
        .location()
        .origin()
        .map_err(|_| "no location origin".to_string())
}

/// Same-origin paths get the page origin prepended; absolute URLs pass through.
pub fn resolve_url(origin: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(resolve_url(&origin()?, "/graphql"))
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(errors) = gql_resp.errors {
        if !errors.is_empty() {
            return Err(errors[0].message.clone());
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

// Types mirroring the GraphQL schema

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetInfo {
    pub url: String,
}

#[derive(Deserialize)]
pub struct DatasetResponse {
    pub dataset: DatasetInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub points_of_interest: Vec<PointOfInterest>,
}

/// Everything the map needs before it can draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub dataset: Dataset,
    pub points: Vec<PointOfInterest>,
}

// API functions

pub async fn fetch_dataset_url() -> Result<String, String> {
    let resp: DatasetResponse = query(r#"query { dataset { url } }"#, None).await?;
    Ok(resp.dataset.url)
}

pub async fn fetch_points_of_interest() -> Result<Vec<PointOfInterest>, String> {
    let resp: PointsResponse = query(
        r#"query { pointsOfInterest { name region lon lat color } }"#,
        None,
    )
    .await?;
    Ok(resp.points_of_interest)
}

pub async fn fetch_feature_collection(url: &str) -> Result<FeatureCollection, String> {
    let resp = reqwest::Client::new()
        .get(resolve_url(&origin()?, url))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("GET {} returned {}", url, resp.status()));
    }
    let body = resp.text().await.map_err(|e| e.to_string())?;
    FeatureCollection::from_json(&body).map_err(|e| e.to_string())
}

/// Missing points of interest leave the regions usable.
fn points_or_empty(result: Result<Vec<PointOfInterest>, String>) -> Vec<PointOfInterest> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load points of interest, drawing regions only");
        Vec::new()
    })
}

/// Fetch the region GeoJSON and the points of interest. Only a dataset
/// failure is an error.
pub async fn load_map_data() -> Result<MapData, String> {
    let url = fetch_dataset_url().await?;
    let collection = fetch_feature_collection(&url).await?;
    let dataset = Dataset::from_collection(&collection);
    let points = points_or_empty(fetch_points_of_interest().await);
    Ok(MapData { dataset, points })
}
