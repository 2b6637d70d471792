//! Setup comment entity - A comment under a showcased setup.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setup comment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setup_comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Setup this comment belongs to
    pub setup_id: i64,
    /// Author of the comment
    pub user_id: i64,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::setup::Entity",
        from = "Column::SetupId",
        to = "super::setup::Column::Id"
    )]
    Setup,
}

impl Related<super::setup::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Setup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
