use std::sync::Arc;

use async_graphql::{Context, Object, SimpleObject};
use recruiting_map_shared::models::PointOfInterest;

use crate::assets::Assets;

// GraphQL output types

#[derive(SimpleObject, Clone)]
pub struct GqlPointOfInterest {
    pub name: String,
    pub region: String,
    pub lon: f64,
    pub lat: f64,
    /// 0xRRGGBB
    pub color: u32,
}

impl From<&PointOfInterest> for GqlPointOfInterest {
    fn from(p: &PointOfInterest) -> Self {
        GqlPointOfInterest {
            name: p.name.clone(),
            region: p.region.clone(),
            lon: p.lon,
            lat: p.lat,
            color: p.color,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlDataset {
    /// Where the frontend fetches the region GeoJSON from.
    pub url: String,
    /// Region names, when the dataset is served locally.
    pub regions: Option<Vec<String>>,
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn points_of_interest(
        &self,
        ctx: &Context<'_>,
        region: Option<String>,
    ) -> async_graphql::Result<Vec<GqlPointOfInterest>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let points = match region.as_deref() {
            Some(region) => assets.points_in_region(region).map(GqlPointOfInterest::from).collect(),
            None => assets.points.iter().map(GqlPointOfInterest::from).collect(),
        };
        Ok(points)
    }

    async fn dataset(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlDataset> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(GqlDataset {
            url: assets.geojson_url.clone(),
            regions: assets.region_names.clone(),
        })
    }
}

pub type Schema =
    async_graphql::Schema<QueryRoot, async_graphql::EmptyMutation, async_graphql::EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(
        QueryRoot,
        async_graphql::EmptyMutation,
        async_graphql::EmptySubscription,
    )
    .data(assets)
    .finish()
}
