//! Budget builder endpoints.
//!
//! The client owns the in-progress [`Build`] and sends it back with every
//! request; nothing about a build is stored server-side.

use super::SharedState;
use crate::{
    config::app::BudgetPreset,
    core::{
        allocator::allocate,
        build::{Build, BuildSummary, ReplacementOptions},
        catalog::{fetch_with_fallback, load_candidates},
        part::{Budget, Category, Part},
    },
    errors::Result,
};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    presets: Vec<BudgetPreset>,
    weights: BTreeMap<Category, f64>,
}

/// Budget presets and the category weights in use.
pub async fn presets(State(state): State<SharedState>) -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: state.config.builder.presets.clone(),
        weights: state.weights.iter().collect(),
    })
}

/// A build together with its totals.
#[derive(Debug, Serialize)]
pub struct BuildResponse {
    build: Build,
    summary: BuildSummary,
}

impl From<Build> for BuildResponse {
    fn from(build: Build) -> Self {
        let summary = build.summary();
        Self { build, summary }
    }
}

#[derive(Debug, Deserialize)]
pub struct AutoBuildRequest {
    budget: f64,
}

/// Fills every category for a budget.
pub async fn auto_build(
    State(state): State<SharedState>,
    Json(body): Json<AutoBuildRequest>,
) -> Result<Json<BuildResponse>> {
    let budget = Budget::from_amount(body.budget)?;
    let candidates = load_candidates(
        state.catalog.as_ref(),
        state.config.builder.candidates_per_category,
    )
    .await;

    let build = allocate(budget, &state.weights, &candidates)?;
    info!(
        "Auto build for budget {:.2}: total {:.2}",
        budget.amount(),
        build.total_price()
    );
    Ok(Json(build.into()))
}

#[derive(Debug, Deserialize)]
pub struct OptionsRequest {
    build: Build,
    category: String,
}

/// Replacement candidates for one category, flagged by affordability.
pub async fn options(
    State(state): State<SharedState>,
    Json(body): Json<OptionsRequest>,
) -> Result<Json<ReplacementOptions>> {
    body.build.validate()?;
    let category: Category = body.category.parse()?;
    let candidates = fetch_with_fallback(
        state.catalog.as_ref(),
        category,
        state.config.builder.candidates_per_category,
    )
    .await;

    Ok(Json(body.build.replacement_options(category, &candidates)))
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    build: Build,
    part: Part,
}

/// Puts a part into its category and returns the new build.
pub async fn select(Json(body): Json<SelectRequest>) -> Result<Json<BuildResponse>> {
    body.build.validate()?;
    body.part.validate()?;

    Ok(Json(body.build.with_selection(body.part).into()))
}
