//! Account business logic - registration, email verification, sessions and password resets.
//!
//! Passwords are stored as bcrypt hashes. Verification codes, reset tokens and
//! session tokens are random secrets handed to the user once; only their
//! SHA-256 digests are stored, so a leaked database cannot be replayed.

use crate::{
    config::app::AuthConfig,
    core::mailer::{Mailer, OutgoingEmail},
    entities::{
        AuthToken, AuthTokenColumn, Session, SessionColumn, User, UserColumn, auth_token, session,
        user,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use rand::Rng;
use reqwest::Url;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::{collections::HashMap, fmt::Write as _};
use tracing::{info, warn};

/// bcrypt work factor for new password hashes.
pub const BCRYPT_COST: u32 = 10;

/// Shortest password accepted at registration.
pub const MIN_REGISTER_PASSWORD: usize = 6;

/// Shortest password accepted by a reset.
pub const MIN_RESET_PASSWORD: usize = 8;

/// Hex SHA-256 of a secret.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Random 6-digit verification code.
#[must_use]
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Random 32-byte token as 64 hex characters.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Trims and lowercases an email address.
///
/// # Errors
/// Returns [`Error::Validation`] when the result is not a plausible address.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::validation("A valid email address is required")),
    }
}

fn check_password(password: &str, min_len: usize) -> Result<()> {
    if password.chars().count() < min_len {
        return Err(Error::validation(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// User id
    pub id: i64,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Whether the email address has been confirmed
    pub email_verified: bool,
    /// Image URL of the user's setup
    pub setup_image: Option<String>,
    /// Account creation time
    pub created_at: DateTimeUtc,
}

impl From<user::Model> for Profile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            email_verified: user.email_verified_at.is_some(),
            setup_image: user.setup_image,
            created_at: user.created_at,
        }
    }
}

/// A freshly issued login session.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    /// Bearer token; shown once
    pub token: String,
    /// When the token stops working
    pub expires_at: DateTimeUtc,
    /// The signed-in user
    pub user: Profile,
}

/// Finds a user by id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))
}

/// Finds a user by email address.
pub async fn find_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(UserColumn::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Display names for a set of user ids, "Anonymous" for blank names.
///
/// Ids without a user row are absent from the map; see [`author_name`].
pub async fn display_names<C>(
    db: &C,
    user_ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<i64> = user_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(User::find()
        .filter(UserColumn::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|user| (user.id, user.display_name()))
        .collect())
}

/// Looks up an author in a [`display_names`] map.
#[must_use]
pub fn author_name(names: &HashMap<i64, String>, user_id: i64) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| user::display_name(None))
}

/// Replaces any outstanding token of `purpose` for the user with a new one.
async fn issue_token<C>(
    db: &C,
    user_id: i64,
    purpose: &str,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<auth_token::Model>
where
    C: ConnectionTrait,
{
    AuthToken::delete_many()
        .filter(AuthTokenColumn::UserId.eq(user_id))
        .filter(AuthTokenColumn::Purpose.eq(purpose))
        .exec(db)
        .await?;

    let now = Utc::now();
    auth_token::ActiveModel {
        user_id: Set(user_id),
        purpose: Set(purpose.to_string()),
        token_hash: Set(hash_secret(secret)),
        expires_at: Set(now + ttl),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Looks up a live token without using it up.
///
/// An expired token is deleted on `db` before [`Error::TokenExpired`] is
/// returned, so callers must not pass a transaction they roll back on error.
async fn live_token<C>(db: &C, user_id: i64, purpose: &str, secret: &str) -> Result<auth_token::Model>
where
    C: ConnectionTrait,
{
    let token = AuthToken::find()
        .filter(AuthTokenColumn::UserId.eq(user_id))
        .filter(AuthTokenColumn::Purpose.eq(purpose))
        .filter(AuthTokenColumn::TokenHash.eq(hash_secret(secret)))
        .one(db)
        .await?
        .ok_or(Error::InvalidToken)?;

    if token.expires_at < Utc::now() {
        AuthToken::delete_by_id(token.id).exec(db).await?;
        return Err(Error::TokenExpired);
    }
    Ok(token)
}

/// Checks a token and deletes it.
async fn consume_token<C>(db: &C, user_id: i64, purpose: &str, secret: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let token = live_token(db, user_id, purpose, secret).await?;
    AuthToken::delete_by_id(token.id).exec(db).await?;
    Ok(())
}

/// Creates an unverified account and emails a verification code.
///
/// If the email cannot be sent the account is removed again and the mail error
/// is returned, so the address can register later.
///
/// # Errors
/// - [`Error::Validation`] for a missing field, bad email or short password
/// - [`Error::Conflict`] when the email is already registered
/// - the mailer's error when sending fails
pub async fn register(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    auth: &AuthConfig,
    email: &str,
    password: &str,
    name: &str,
) -> Result<user::Model> {
    let name = name.trim();
    if name.is_empty() || password.is_empty() || email.trim().is_empty() {
        return Err(Error::validation("Email, password and name are required"));
    }
    let email = normalize_email(email)?;
    check_password(password, MIN_REGISTER_PASSWORD)?;

    if find_user_by_email(db, &email).await?.is_some() {
        return Err(Error::Conflict {
            message: "Email already registered".to_string(),
        });
    }

    let password_hash = bcrypt::hash(password, BCRYPT_COST)?;
    let code = generate_code();

    let txn = db.begin().await?;
    let user = user::ActiveModel {
        email: Set(email.clone()),
        name: Set(name.to_string()),
        password_hash: Set(password_hash),
        email_verified_at: Set(None),
        setup_image: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    issue_token(&txn, user.id, auth_token::PURPOSE_VERIFY, &code, auth.verification_ttl()).await?;
    txn.commit().await?;

    let email_message =
        OutgoingEmail::verification(&email, name, &code, auth.verification_ttl_minutes);
    if let Err(e) = mailer.send(email_message).await {
        warn!("Verification email to {email} failed, removing account: {e}");
        remove_user(db, user.id).await?;
        return Err(e);
    }

    info!("Registered user {} ({})", user.id, user.email);
    Ok(user)
}

async fn remove_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    AuthToken::delete_many()
        .filter(AuthTokenColumn::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Session::delete_many()
        .filter(SessionColumn::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    User::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Confirms an email address with the emailed code.
///
/// # Errors
/// - [`Error::InvalidToken`] for an unknown email or wrong code
/// - [`Error::TokenExpired`] when the code is too old (it is deleted)
pub async fn verify_email(db: &DatabaseConnection, email: &str, code: &str) -> Result<user::Model> {
    let email = normalize_email(email).map_err(|_| Error::InvalidToken)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::validation("Email and code are required"));
    }

    let user = find_user_by_email(db, &email)
        .await?
        .ok_or(Error::InvalidToken)?;

    consume_token(db, user.id, auth_token::PURPOSE_VERIFY, code).await?;

    let mut active: user::ActiveModel = user.into();
    active.email_verified_at = Set(Some(Utc::now()));
    let user = active.update(db).await?;

    info!("Verified email for user {}", user.id);
    Ok(user)
}

/// Issues and emails a fresh verification code to a signed-in user.
///
/// # Errors
/// Returns the mailer's error when sending fails.
pub async fn request_verification(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    auth: &AuthConfig,
    user: &user::Model,
) -> Result<()> {
    let code = generate_code();
    issue_token(db, user.id, auth_token::PURPOSE_VERIFY, &code, auth.verification_ttl()).await?;

    mailer
        .send(OutgoingEmail::verification(
            &user.email,
            &user.name,
            &code,
            auth.verification_ttl_minutes,
        ))
        .await
}

/// Checks credentials and opens a session.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] when the email is unknown or the
/// password does not match.
pub async fn login(
    db: &DatabaseConnection,
    auth: &AuthConfig,
    email: &str,
    password: &str,
) -> Result<IssuedSession> {
    let email = normalize_email(email).map_err(|_| Error::InvalidCredentials)?;
    let user = find_user_by_email(db, &email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !bcrypt::verify(password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    let token = generate_token();
    let now = Utc::now();
    let session = session::ActiveModel {
        user_id: Set(user.id),
        token_hash: Set(hash_secret(&token)),
        expires_at: Set(now + auth.session_ttl()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("User {} signed in", user.id);
    Ok(IssuedSession {
        token,
        expires_at: session.expires_at,
        user: user.into(),
    })
}

/// Resolves a bearer token to its user.
///
/// # Errors
/// Returns [`Error::Unauthorized`] for unknown or expired sessions.
pub async fn authenticate(db: &DatabaseConnection, token: &str) -> Result<user::Model> {
    let session = Session::find()
        .filter(SessionColumn::TokenHash.eq(hash_secret(token)))
        .one(db)
        .await?
        .ok_or(Error::Unauthorized)?;

    if session.expires_at < Utc::now() {
        Session::delete_by_id(session.id).exec(db).await?;
        return Err(Error::Unauthorized);
    }

    User::find_by_id(session.user_id)
        .one(db)
        .await?
        .ok_or(Error::Unauthorized)
}

/// Ends the session identified by `token`. Unknown tokens are ignored.
pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_many()
        .filter(SessionColumn::TokenHash.eq(hash_secret(token)))
        .exec(db)
        .await?;
    Ok(())
}

/// Emails a password reset link.
///
/// Succeeds without sending anything when the email is unknown, so callers
/// cannot probe which addresses are registered.
///
/// # Errors
/// Returns the mailer's error when sending to a known user fails.
pub async fn forgot_password(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    auth: &AuthConfig,
    public_url: &str,
    email: &str,
) -> Result<()> {
    let Ok(email) = normalize_email(email) else {
        return Err(Error::validation("Email is required"));
    };
    let Some(user) = find_user_by_email(db, &email).await? else {
        info!("Password reset requested for unknown email");
        return Ok(());
    };

    let token = generate_token();
    issue_token(db, user.id, auth_token::PURPOSE_RESET, &token, auth.reset_ttl()).await?;

    let link = reset_link(public_url, &token, &user.email)?;
    mailer
        .send(OutgoingEmail::password_reset(
            &user.email,
            &user.name,
            &link,
            auth.reset_ttl_minutes,
        ))
        .await
}

fn reset_link(public_url: &str, token: &str, email: &str) -> Result<String> {
    let page = format!("{}/auth/reset-password", public_url.trim_end_matches('/'));
    Url::parse_with_params(&page, &[("token", token), ("email", email)])
        .map(String::from)
        .map_err(|e| Error::Config {
            message: format!("Invalid PUBLIC_URL '{public_url}': {e}"),
        })
}

/// Sets a new password using an emailed reset token.
///
/// All of the user's sessions are ended.
///
/// # Errors
/// - [`Error::Validation`] for a short password
/// - [`Error::NotFound`] for an unknown email
/// - [`Error::InvalidToken`] / [`Error::TokenExpired`] for a bad token
pub async fn reset_password(
    db: &DatabaseConnection,
    email: &str,
    token: &str,
    password: &str,
) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::InvalidToken);
    }
    check_password(password, MIN_RESET_PASSWORD)?;
    let email = normalize_email(email)?;

    let user = find_user_by_email(db, &email)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "user",
            id: email.clone(),
        })?;

    let password_hash = bcrypt::hash(password, BCRYPT_COST)?;

    let reset_token = live_token(db, user.id, auth_token::PURPOSE_RESET, token.trim()).await?;

    let txn = db.begin().await?;
    AuthToken::delete_by_id(reset_token.id).exec(&txn).await?;
    Session::delete_many()
        .filter(SessionColumn::UserId.eq(user.id))
        .exec(&txn)
        .await?;
    let user_id = user.id;
    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    active.update(&txn).await?;
    txn.commit().await?;

    info!("Password reset for user {user_id}");
    Ok(())
}

/// Stores the image URL of the user's own setup.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank URL.
pub async fn set_setup_image(
    db: &DatabaseConnection,
    user: user::Model,
    image: &str,
) -> Result<user::Model> {
    let image = image.trim();
    if image.is_empty() {
        return Err(Error::validation("Image is required"));
    }

    let mut active: user::ActiveModel = user.into();
    active.setup_image = Set(Some(image.to_string()));
    active.update(db).await.map_err(Into::into)
}
