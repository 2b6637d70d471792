//! Setup entity - A finished PC shown in the showcase.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setup database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setups")]
pub struct Model {
    /// Unique identifier for the setup
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the setup
    pub user_id: i64,
    pub title: String,
    pub description: String,
    /// Photo URL
    pub image: String,
    /// Average rating, 0 when unrated
    pub rating: f64,
    pub rating_count: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Setup and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A setup holds many comments
    #[sea_orm(has_many = "super::setup_comment::Entity")]
    Comment,
}

impl Related<super::setup_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
