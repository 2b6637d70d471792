//! Rating entity - One user's 0 to 10 score for a ticket, message, setup or comment.
//!
//! `(target_kind, target_id, user_id)` is unique.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rating database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `"ticket"`, `"message"`, `"setup"` or `"comment"`
    pub target_kind: String,
    pub target_id: i64,
    pub user_id: i64,
    /// Score from 0 to 10
    pub value: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
