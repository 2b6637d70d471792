//! Database configuration module for the PC builder.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`.
//! Composite uniqueness for feedback rows (one reaction and one rating per user
//! per target) is not expressible on the entity, so those indexes are created here.

use crate::entities::{
    AuthToken, Message, Rating, RatingColumn, Reaction, ReactionColumn, Session, Setup,
    SetupComment, Ticket, User,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement},
};
use std::path::Path;

/// Default database location when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/pc_builder.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_parent_dir(&database_url)?;

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the directory holding a file-backed `SQLite` database.
///
/// Other URLs, including in-memory `SQLite`, are left alone.
pub fn ensure_sqlite_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();

    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Safe to run on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Session).await?;
    create_table(db, &schema, AuthToken).await?;
    create_table(db, &schema, Ticket).await?;
    create_table(db, &schema, Message).await?;
    create_table(db, &schema, Setup).await?;
    create_table(db, &schema, SetupComment).await?;
    create_table(db, &schema, Reaction).await?;
    create_table(db, &schema, Rating).await?;

    let reaction_index = unique_target_index("idx_reactions_target_user")
        .table(Reaction)
        .col(ReactionColumn::TargetKind)
        .col(ReactionColumn::TargetId)
        .col(ReactionColumn::UserId)
        .to_owned();
    let rating_index = unique_target_index("idx_ratings_target_user")
        .table(Rating)
        .col(RatingColumn::TargetKind)
        .col(RatingColumn::TargetId)
        .col(RatingColumn::UserId)
        .to_owned();

    db.execute(builder.build(&reaction_index)).await?;
    db.execute(builder.build(&rating_index)).await?;

    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}

fn unique_target_index(name: &str) -> IndexCreateStatement {
    Index::create().name(name).unique().if_not_exists().to_owned()
}
