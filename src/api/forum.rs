//! Forum endpoints. Reads are public; every write needs a bearer token.

use super::{SharedState, auth::AuthUser};
use crate::{
    core::{
        feedback::{RatingSummary, ReactionCounts, ReactionKind},
        forum::{self, MessageView, TicketDetail, TicketView},
    },
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

pub async fn list_tickets(State(state): State<SharedState>) -> Result<Json<Vec<TicketView>>> {
    forum::list_tickets(&state.db).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

pub async fn create_ticket(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(body): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketView>)> {
    let ticket = forum::create_ticket(&state.db, &auth.user, &body.title, &body.description).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<TicketDetail>> {
    forum::get_ticket(&state.db, id).await.map(Json)
}

pub async fn delete_ticket(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    forum::delete_ticket(&state.db, auth.user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ClapResponse {
    claps: i64,
}

pub async fn clap_ticket(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ClapResponse>> {
    let claps = forum::clap_ticket(&state.db, auth.user.id, id).await?;
    Ok(Json(ClapResponse { claps }))
}

/// Body of every rating endpoint.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// Score from 0 to 10
    pub rating: f64,
}

pub async fn rate_ticket(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<RatingSummary>> {
    forum::rate_ticket(&state.db, auth.user.id, id, body.rating)
        .await
        .map(Json)
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    content: String,
}

pub async fn post_message(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<MessageRequest>,
) -> Result<(StatusCode, Json<MessageView>)> {
    let message = forum::post_message(&state.db, &auth.user, id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn delete_message(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, message_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    forum::delete_message(&state.db, auth.user.id, id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rate_message(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, message_id)): Path<(i64, i64)>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<RatingSummary>> {
    forum::rate_message(&state.db, auth.user.id, id, message_id, body.rating)
        .await
        .map(Json)
}

/// Body of every reaction endpoint.
///
/// The kind is parsed by hand so an unknown value is a 400 like any other
/// validation failure.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    /// `like` or `dislike`
    #[serde(default)]
    pub kind: String,
}

impl ReactionRequest {
    /// Parsed reaction kind.
    ///
    /// # Errors
    /// Returns a validation error for an unknown kind.
    pub fn kind(&self) -> Result<ReactionKind> {
        self.kind.parse()
    }
}

pub async fn react_to_message(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, message_id)): Path<(i64, i64)>,
    Json(body): Json<ReactionRequest>,
) -> Result<Json<ReactionCounts>> {
    forum::react_to_message(&state.db, auth.user.id, id, message_id, body.kind()?)
        .await
        .map(Json)
}
