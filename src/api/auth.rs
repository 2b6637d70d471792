//! Account endpoints and the bearer-token extractor.

use super::SharedState;
use crate::{
    core::account::{self, IssuedSession, Profile},
    entities::user,
    errors::{Error, Result},
};
use axum::{
    Json, async_trait,
    extract::{FromRequestParts, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// The signed-in user of a request.
///
/// Rejects with 401 when the `Authorization: Bearer` header is missing or
/// does not name a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user
    pub user: user::Model,
    /// The bearer token that authenticated the request
    pub token: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

#[async_trait]
impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
        let user = account::authenticate(&state.db, &token).await?;
        Ok(Self { user, token })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
}

pub async fn register(
    State(state): State<SharedState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let user = account::register(
        &state.db,
        state.mailer.as_ref(),
        &state.config.auth,
        &body.email,
        &body.password,
        &body.name,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful. Check your email for the verification code.",
            "user_id": user.id,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    code: String,
}

pub async fn verify(
    State(state): State<SharedState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<Profile>> {
    let user = account::verify_email(&state.db, &body.email, &body.code).await?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login(
    State(state): State<SharedState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<IssuedSession>> {
    account::login(&state.db, &state.config.auth, &body.email, &body.password)
        .await
        .map(Json)
}

pub async fn logout(State(state): State<SharedState>, auth: AuthUser) -> Result<StatusCode> {
    account::logout(&state.db, &auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    email: String,
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    account::forgot_password(
        &state.db,
        state.mailer.as_ref(),
        &state.config.auth,
        &state.public_url,
        &body.email,
    )
    .await?;

    Ok(Json(json!({
        "message": "If that email is registered, a reset link has been sent."
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    token: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    account::reset_password(&state.db, &body.email, &body.token, &body.password).await?;
    Ok(Json(json!({ "message": "Password has been reset." })))
}

pub async fn request_verification(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Value>> {
    account::request_verification(
        &state.db,
        state.mailer.as_ref(),
        &state.config.auth,
        &auth.user,
    )
    .await?;
    Ok(Json(json!({ "message": "Verification code sent." })))
}

#[derive(Debug, Deserialize)]
pub struct SetupImageRequest {
    #[serde(default)]
    setup_image: String,
}

pub async fn set_setup_image(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(body): Json<SetupImageRequest>,
) -> Result<Json<Profile>> {
    let user = account::set_setup_image(&state.db, auth.user, &body.setup_image).await?;
    Ok(Json(user.into()))
}

pub async fn me(auth: AuthUser) -> Json<Profile> {
    Json(auth.user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")).as_deref(), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123")).as_deref(), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
