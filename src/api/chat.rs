use super::SharedState;
use crate::{core::chat, errors::Result};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    reply: String,
}

/// Forwards one question to the AI assistant.
pub async fn chat(
    State(state): State<SharedState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let reply = chat::ask(state.chat.as_ref(), &body.message).await?;
    Ok(Json(ChatResponse { reply }))
}
