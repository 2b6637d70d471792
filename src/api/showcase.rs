use super::{
    SharedState,
    auth::AuthUser,
    forum::{RatingRequest, ReactionRequest},
};
use crate::{
    core::{
        feedback::{RatingSummary, ReactionCounts},
        showcase::{self, CommentView, SetupDetail, SetupView},
    },
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

pub async fn list_setups(State(state): State<SharedState>) -> Result<Json<Vec<SetupView>>> {
    showcase::list_setups(&state.db).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct CreateSetupRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
}

pub async fn create_setup(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(body): Json<CreateSetupRequest>,
) -> Result<(StatusCode, Json<SetupView>)> {
    let setup = showcase::create_setup(
        &state.db,
        &auth.user,
        &body.title,
        &body.description,
        &body.image,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(setup)))
}

pub async fn get_setup(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<SetupDetail>> {
    showcase::get_setup(&state.db, id).await.map(Json)
}

pub async fn delete_setup(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    showcase::delete_setup(&state.db, auth.user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn react_to_setup(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ReactionRequest>,
) -> Result<Json<ReactionCounts>> {
    showcase::react_to_setup(&state.db, auth.user.id, id, body.kind()?)
        .await
        .map(Json)
}

pub async fn rate_setup(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<RatingSummary>> {
    showcase::rate_setup(&state.db, auth.user.id, id, body.rating)
        .await
        .map(Json)
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    content: String,
}

pub async fn add_comment(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentView>)> {
    let comment = showcase::add_comment(&state.db, &auth.user, id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    showcase::delete_comment(&state.db, auth.user.id, id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn react_to_comment(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, comment_id)): Path<(i64, i64)>,
    Json(body): Json<ReactionRequest>,
) -> Result<Json<ReactionCounts>> {
    showcase::react_to_comment(&state.db, auth.user.id, id, comment_id, body.kind()?)
        .await
        .map(Json)
}

pub async fn rate_comment(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, comment_id)): Path<(i64, i64)>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<RatingSummary>> {
    showcase::rate_comment(&state.db, auth.user.id, id, comment_id, body.rating)
        .await
        .map(Json)
}
