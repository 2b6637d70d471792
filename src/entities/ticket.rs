//! Ticket entity - A forum thread.
//!
//! `claps`, `rating` and `rating_count` are denormalized from the feedback
//! tables and recomputed whenever feedback changes.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ticket database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    /// Unique identifier for the ticket
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Author of the ticket
    pub user_id: i64,
    /// Thread title
    pub title: String,
    /// Opening post
    pub description: String,
    /// Number of users who clapped
    pub claps: i64,
    /// Average rating, 0 when unrated
    pub rating: f64,
    /// Number of ratings behind the average
    pub rating_count: i64,
    /// When the ticket was opened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Ticket and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A ticket holds many messages
    #[sea_orm(has_many = "super::message::Entity")]
    Message,
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
