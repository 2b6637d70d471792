//! Auth token entity - Single-use email verification codes and password reset tokens.
//!
//! `purpose` is `"verify"` or `"reset"`. Only the SHA-256 of the secret is stored.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purpose value for email verification codes
pub const PURPOSE_VERIFY: &str = "verify";
/// Purpose value for password reset tokens
pub const PURPOSE_RESET: &str = "reset";

/// Auth token database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User the token was issued to
    pub user_id: i64,
    /// `"verify"` or `"reset"`
    pub purpose: String,
    /// Hex SHA-256 of the code or token
    pub token_hash: String,
    /// Token is rejected after this instant
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
