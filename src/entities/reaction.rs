//! Reaction entity - One user's like, dislike or clap on a ticket, message, setup or comment.
//!
//! `(target_kind, target_id, user_id)` is unique; switching between like and
//! dislike updates `kind` in place.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `"ticket"`, `"message"`, `"setup"` or `"comment"`
    pub target_kind: String,
    pub target_id: i64,
    pub user_id: i64,
    /// `"like"`, `"dislike"` or `"clap"`
    pub kind: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
