//! Reactions and ratings shared by the forum and the showcase.
//!
//! Each user holds at most one reaction and one rating per target. Counters and
//! averages stored on the target rows are derived from these tables; callers
//! recompute them with [`reaction_counts`] and [`rating_summary`] inside the
//! same database transaction that changed the feedback.

use crate::{
    entities::{Rating, RatingColumn, Reaction, ReactionColumn, rating, reaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Highest accepted rating.
pub const MAX_RATING: f64 = 10.0;

/// Kind of row a reaction or rating points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Forum ticket
    Ticket,
    /// Forum message
    Message,
    /// Showcased setup
    Setup,
    /// Comment under a setup
    Comment,
}

impl TargetKind {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Message => "message",
            Self::Setup => "setup",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's reaction to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    /// Thumbs up
    Like,
    /// Thumbs down
    Dislike,
    /// Applause for a ticket; cannot be withdrawn or repeated
    Clap,
}

impl ReactionKind {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Clap => "clap",
        }
    }
}

impl FromStr for ReactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "clap" => Ok(Self::Clap),
            _ => Err(Error::validation(format!("Unknown reaction: {s}"))),
        }
    }
}

/// How a repeated rating from the same user is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingPolicy {
    /// Replace the user's previous score
    Upsert,
    /// Reject a second score with [`Error::Conflict`]
    Once,
}

/// Reaction totals for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    /// Number of likes
    pub likes: i64,
    /// Number of dislikes
    pub dislikes: i64,
    /// Number of claps
    pub claps: i64,
}

/// Average score for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean of all scores, 0 when unrated
    pub rating: f64,
    /// Number of scores
    pub rating_count: i64,
}

/// Checks that a score is a finite number between 0 and 10.
///
/// # Errors
/// Returns [`Error::Validation`] otherwise.
pub fn validate_rating(value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(Error::validation("Rating must be between 0 and 10"))
    }
}

/// Records `user_id`'s reaction to a target and returns the new totals.
///
/// A repeated like or dislike is a no-op; switching between them replaces the
/// previous reaction. A repeated clap is rejected.
///
/// # Errors
/// Returns [`Error::Conflict`] for a second clap, or a database error.
pub async fn react<C>(
    db: &C,
    target: TargetKind,
    target_id: i64,
    user_id: i64,
    kind: ReactionKind,
) -> Result<ReactionCounts>
where
    C: ConnectionTrait,
{
    let existing = Reaction::find()
        .filter(ReactionColumn::TargetKind.eq(target.as_str()))
        .filter(ReactionColumn::TargetId.eq(target_id))
        .filter(ReactionColumn::UserId.eq(user_id))
        .one(db)
        .await?;

    match existing {
        Some(previous) if previous.kind == kind.as_str() => {
            if kind == ReactionKind::Clap {
                return Err(Error::Conflict {
                    message: format!("You have already clapped for this {target}"),
                });
            }
        }
        Some(previous) => {
            let mut active: reaction::ActiveModel = previous.into();
            active.kind = Set(kind.as_str().to_string());
            active.update(db).await?;
        }
        None => {
            reaction::ActiveModel {
                target_kind: Set(target.as_str().to_string()),
                target_id: Set(target_id),
                user_id: Set(user_id),
                kind: Set(kind.as_str().to_string()),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    reaction_counts(db, target, target_id).await
}

/// Current reaction totals for a target.
pub async fn reaction_counts<C>(db: &C, target: TargetKind, target_id: i64) -> Result<ReactionCounts>
where
    C: ConnectionTrait,
{
    let count = |kind: ReactionKind| {
        Reaction::find()
            .filter(ReactionColumn::TargetKind.eq(target.as_str()))
            .filter(ReactionColumn::TargetId.eq(target_id))
            .filter(ReactionColumn::Kind.eq(kind.as_str()))
            .count(db)
    };

    Ok(ReactionCounts {
        likes: to_i64(count(ReactionKind::Like).await?),
        dislikes: to_i64(count(ReactionKind::Dislike).await?),
        claps: to_i64(count(ReactionKind::Clap).await?),
    })
}

/// Records `user_id`'s score for a target and returns the new average.
///
/// # Errors
/// Returns [`Error::Validation`] for an out-of-range score,
/// [`Error::Conflict`] for a second score under [`RatingPolicy::Once`], or a
/// database error.
pub async fn rate<C>(
    db: &C,
    target: TargetKind,
    target_id: i64,
    user_id: i64,
    value: f64,
    policy: RatingPolicy,
) -> Result<RatingSummary>
where
    C: ConnectionTrait,
{
    let value = validate_rating(value)?;

    let existing = Rating::find()
        .filter(RatingColumn::TargetKind.eq(target.as_str()))
        .filter(RatingColumn::TargetId.eq(target_id))
        .filter(RatingColumn::UserId.eq(user_id))
        .one(db)
        .await?;

    match (existing, policy) {
        (Some(_), RatingPolicy::Once) => {
            return Err(Error::Conflict {
                message: format!("You have already rated this {target}"),
            });
        }
        (Some(previous), RatingPolicy::Upsert) => {
            let mut active: rating::ActiveModel = previous.into();
            active.value = Set(value);
            active.update(db).await?;
        }
        (None, _) => {
            rating::ActiveModel {
                target_kind: Set(target.as_str().to_string()),
                target_id: Set(target_id),
                user_id: Set(user_id),
                value: Set(value),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    rating_summary(db, target, target_id).await
}

/// Current average score for a target.
pub async fn rating_summary<C>(db: &C, target: TargetKind, target_id: i64) -> Result<RatingSummary>
where
    C: ConnectionTrait,
{
    let scores: Vec<f64> = Rating::find()
        .filter(RatingColumn::TargetKind.eq(target.as_str()))
        .filter(RatingColumn::TargetId.eq(target_id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.value)
        .collect();

    Ok(average(&scores))
}

#[allow(clippy::cast_precision_loss)]
fn average(scores: &[f64]) -> RatingSummary {
    if scores.is_empty() {
        return RatingSummary::default();
    }
    RatingSummary {
        rating: scores.iter().sum::<f64>() / scores.len() as f64,
        rating_count: to_i64(scores.len() as u64),
    }
}

/// Removes every reaction and rating attached to the given targets.
pub async fn clear_feedback<C>(db: &C, target: TargetKind, target_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    if target_ids.is_empty() {
        return Ok(());
    }

    Reaction::delete_many()
        .filter(ReactionColumn::TargetKind.eq(target.as_str()))
        .filter(ReactionColumn::TargetId.is_in(target_ids.iter().copied()))
        .exec(db)
        .await?;
    Rating::delete_many()
        .filter(RatingColumn::TargetKind.eq(target.as_str()))
        .filter(RatingColumn::TargetId.is_in(target_ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(())
}

fn to_i64(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
