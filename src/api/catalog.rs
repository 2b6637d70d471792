//! Product listing and store availability endpoints.

use super::SharedState;
use crate::{
    core::{
        availability::{self, AvailabilityReport},
        catalog::{ProductListing, list_products},
    },
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    category: String,
    limit: Option<usize>,
}

/// Live products for one category. Always 200; failures report `success: false`.
pub async fn products(
    State(state): State<SharedState>,
    Query(query): Query<ProductsQuery>,
) -> Json<ProductListing> {
    Json(list_products(state.catalog.as_ref(), &query.category, query.limit).await)
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    brand: String,
    #[serde(default)]
    model: String,
}

pub async fn check_availability(
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityReport>> {
    availability::check_availability(&query.brand, &query.model).map(Json)
}
