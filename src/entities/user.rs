//! User entity - A registered account.
//!
//! Email is unique. `email_verified_at` stays `None` until the emailed code is
//! confirmed. `setup_image` is the URL shown next to the user's forum posts.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, stored lowercase
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the email address was confirmed
    pub email_verified_at: Option<DateTimeUtc>,
    /// Image URL of the user's own setup
    pub setup_image: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Name shown on posts, falling back to "Anonymous".
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(Some(&self.name))
    }
}

/// Name shown on posts for an optional user name.
#[must_use]
pub fn display_name(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Anonymous")
        .to_string()
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user can hold many sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
