//! Setup showcase - finished builds with photos, comments, reactions and ratings.

use crate::{
    core::{
        account::{author_name, display_names},
        feedback::{
            self, RatingPolicy, RatingSummary, ReactionCounts, ReactionKind, TargetKind,
        },
    },
    entities::{Setup, SetupColumn, SetupComment, SetupCommentColumn, setup, setup_comment, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// A setup as shown in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupView {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Photo URL
    pub image: String,
    /// Owner display name
    pub author: String,
    pub user_id: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub comment_count: usize,
    pub created_at: DateTimeUtc,
}

/// A comment under a setup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub user_id: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTimeUtc,
}

/// A setup with its comments, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupDetail {
    #[serde(flatten)]
    pub setup: SetupView,
    pub comments: Vec<CommentView>,
}

fn setup_view(setup: setup::Model, author: String, comment_count: usize) -> SetupView {
    SetupView {
        id: setup.id,
        title: setup.title,
        description: setup.description,
        image: setup.image,
        author,
        user_id: setup.user_id,
        rating: setup.rating,
        rating_count: setup.rating_count,
        likes: setup.likes,
        dislikes: setup.dislikes,
        comment_count,
        created_at: setup.created_at,
    }
}

fn comment_view(comment: setup_comment::Model, author: String) -> CommentView {
    CommentView {
        id: comment.id,
        content: comment.content,
        author,
        user_id: comment.user_id,
        likes: comment.likes,
        dislikes: comment.dislikes,
        rating: comment.rating,
        rating_count: comment.rating_count,
        created_at: comment.created_at,
    }
}

async fn find_setup<C>(db: &C, setup_id: i64) -> Result<setup::Model>
where
    C: ConnectionTrait,
{
    Setup::find_by_id(setup_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("setup", setup_id))
}

async fn find_comment<C>(db: &C, setup_id: i64, comment_id: i64) -> Result<setup_comment::Model>
where
    C: ConnectionTrait,
{
    SetupComment::find_by_id(comment_id)
        .filter(SetupCommentColumn::SetupId.eq(setup_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("comment", comment_id))
}

fn like_or_dislike(kind: ReactionKind) -> Result<ReactionKind> {
    match kind {
        ReactionKind::Like | ReactionKind::Dislike => Ok(kind),
        ReactionKind::Clap => Err(Error::validation("Reaction must be like or dislike")),
    }
}

/// All setups, newest first.
pub async fn list_setups(db: &DatabaseConnection) -> Result<Vec<SetupView>> {
    let setups = Setup::find()
        .order_by_desc(SetupColumn::CreatedAt)
        .order_by_desc(SetupColumn::Id)
        .all(db)
        .await?;

    let setup_ids: Vec<i64> = setups.iter().map(|s| s.id).collect();
    let mut comment_counts: HashMap<i64, usize> = HashMap::new();
    if !setup_ids.is_empty() {
        for comment in SetupComment::find()
            .filter(SetupCommentColumn::SetupId.is_in(setup_ids))
            .all(db)
            .await?
        {
            *comment_counts.entry(comment.setup_id).or_default() += 1;
        }
    }

    let names = display_names(db, setups.iter().map(|s| s.user_id)).await?;
    Ok(setups
        .into_iter()
        .map(|setup| {
            let author = author_name(&names, setup.user_id);
            let count = comment_counts.get(&setup.id).copied().unwrap_or(0);
            setup_view(setup, author, count)
        })
        .collect())
}

/// Publishes a setup.
///
/// # Errors
/// Returns [`Error::Validation`] when the title or image is blank.
pub async fn create_setup(
    db: &DatabaseConnection,
    owner: &user::Model,
    title: &str,
    description: &str,
    image: &str,
) -> Result<SetupView> {
    let (title, image) = (title.trim(), image.trim());
    if title.is_empty() || image.is_empty() {
        return Err(Error::validation("Title and image are required"));
    }

    let setup = setup::ActiveModel {
        user_id: Set(owner.id),
        title: Set(title.to_string()),
        description: Set(description.trim().to_string()),
        image: Set(image.to_string()),
        rating: Set(0.0),
        rating_count: Set(0),
        likes: Set(0),
        dislikes: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("User {} published setup {}", owner.id, setup.id);
    Ok(setup_view(setup, owner.display_name(), 0))
}

/// A setup with its comments, oldest first.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown setup.
pub async fn get_setup(db: &DatabaseConnection, setup_id: i64) -> Result<SetupDetail> {
    let setup = find_setup(db, setup_id).await?;
    let comments = SetupComment::find()
        .filter(SetupCommentColumn::SetupId.eq(setup_id))
        .order_by_asc(SetupCommentColumn::CreatedAt)
        .order_by_asc(SetupCommentColumn::Id)
        .all(db)
        .await?;

    let names = display_names(
        db,
        std::iter::once(setup.user_id).chain(comments.iter().map(|c| c.user_id)),
    )
    .await?;

    let author = author_name(&names, setup.user_id);
    let comment_count = comments.len();
    Ok(SetupDetail {
        setup: setup_view(setup, author, comment_count),
        comments: comments
            .into_iter()
            .map(|comment| {
                let author = author_name(&names, comment.user_id);
                comment_view(comment, author)
            })
            .collect(),
    })
}

/// Deletes a setup with its comments and all attached feedback.
///
/// # Errors
/// - [`Error::NotFound`] for an unknown setup
/// - [`Error::Forbidden`] when `user_id` is not the owner
pub async fn delete_setup(db: &DatabaseConnection, user_id: i64, setup_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let setup = find_setup(&txn, setup_id).await?;
    if setup.user_id != user_id {
        return Err(Error::Forbidden);
    }

    let comment_ids: Vec<i64> = SetupComment::find()
        .filter(SetupCommentColumn::SetupId.eq(setup_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    feedback::clear_feedback(&txn, TargetKind::Comment, &comment_ids).await?;
    feedback::clear_feedback(&txn, TargetKind::Setup, &[setup_id]).await?;
    SetupComment::delete_many()
        .filter(SetupCommentColumn::SetupId.eq(setup_id))
        .exec(&txn)
        .await?;
    Setup::delete_by_id(setup_id).exec(&txn).await?;

    txn.commit().await?;
    info!("User {user_id} deleted setup {setup_id}");
    Ok(())
}

/// Comments on a setup.
///
/// # Errors
/// - [`Error::Validation`] for blank content
/// - [`Error::NotFound`] for an unknown setup
pub async fn add_comment(
    db: &DatabaseConnection,
    author: &user::Model,
    setup_id: i64,
    content: &str,
) -> Result<CommentView> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::validation("Comment cannot be empty"));
    }
    find_setup(db, setup_id).await?;

    let comment = setup_comment::ActiveModel {
        setup_id: Set(setup_id),
        user_id: Set(author.id),
        content: Set(content.to_string()),
        likes: Set(0),
        dislikes: Set(0),
        rating: Set(0.0),
        rating_count: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(comment_view(comment, author.display_name()))
}

/// Deletes a comment and its feedback.
///
/// # Errors
/// - [`Error::NotFound`] when the comment is not under this setup
/// - [`Error::Forbidden`] when `user_id` is not the author
pub async fn delete_comment(
    db: &DatabaseConnection,
    user_id: i64,
    setup_id: i64,
    comment_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let comment = find_comment(&txn, setup_id, comment_id).await?;
    if comment.user_id != user_id {
        return Err(Error::Forbidden);
    }

    feedback::clear_feedback(&txn, TargetKind::Comment, &[comment_id]).await?;
    SetupComment::delete_by_id(comment_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Likes or dislikes a setup.
///
/// # Errors
/// - [`Error::Validation`] for a clap
/// - [`Error::NotFound`] for an unknown setup
pub async fn react_to_setup(
    db: &DatabaseConnection,
    user_id: i64,
    setup_id: i64,
    kind: ReactionKind,
) -> Result<ReactionCounts> {
    let kind = like_or_dislike(kind)?;
    let txn = db.begin().await?;

    let setup = find_setup(&txn, setup_id).await?;
    let counts = feedback::react(&txn, TargetKind::Setup, setup_id, user_id, kind).await?;

    let mut active: setup::ActiveModel = setup.into();
    active.likes = Set(counts.likes);
    active.dislikes = Set(counts.dislikes);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(counts)
}

/// Rates a setup, replacing the user's earlier score.
///
/// # Errors
/// - [`Error::Validation`] for a score outside 0 to 10
/// - [`Error::NotFound`] for an unknown setup
pub async fn rate_setup(
    db: &DatabaseConnection,
    user_id: i64,
    setup_id: i64,
    value: f64,
) -> Result<RatingSummary> {
    feedback::validate_rating(value)?;
    let txn = db.begin().await?;

    let setup = find_setup(&txn, setup_id).await?;
    let summary = feedback::rate(
        &txn,
        TargetKind::Setup,
        setup_id,
        user_id,
        value,
        RatingPolicy::Upsert,
    )
    .await?;

    let mut active: setup::ActiveModel = setup.into();
    active.rating = Set(summary.rating);
    active.rating_count = Set(summary.rating_count);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(summary)
}

/// Likes or dislikes a comment.
///
/// # Errors
/// - [`Error::Validation`] for a clap
/// - [`Error::NotFound`] when the comment is not under this setup
pub async fn react_to_comment(
    db: &DatabaseConnection,
    user_id: i64,
    setup_id: i64,
    comment_id: i64,
    kind: ReactionKind,
) -> Result<ReactionCounts> {
    let kind = like_or_dislike(kind)?;
    let txn = db.begin().await?;

    let comment = find_comment(&txn, setup_id, comment_id).await?;
    let counts = feedback::react(&txn, TargetKind::Comment, comment_id, user_id, kind).await?;

    let mut active: setup_comment::ActiveModel = comment.into();
    active.likes = Set(counts.likes);
    active.dislikes = Set(counts.dislikes);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(counts)
}

/// Rates a comment, replacing the user's earlier score.
///
/// # Errors
/// - [`Error::Validation`] for a score outside 0 to 10
/// - [`Error::NotFound`] when the comment is not under this setup
pub async fn rate_comment(
    db: &DatabaseConnection,
    user_id: i64,
    setup_id: i64,
    comment_id: i64,
    value: f64,
) -> Result<RatingSummary> {
    feedback::validate_rating(value)?;
    let txn = db.begin().await?;

    let comment = find_comment(&txn, setup_id, comment_id).await?;
    let summary = feedback::rate(
        &txn,
        TargetKind::Comment,
        comment_id,
        user_id,
        value,
        RatingPolicy::Upsert,
    )
    .await?;

    let mut active: setup_comment::ActiveModel = comment.into();
    active.rating = Set(summary.rating);
    active.rating_count = Set(summary.rating_count);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(summary)
}
