//! Forum business logic - tickets, messages and their feedback.
//!
//! Tickets are threads opened by signed-in users; messages are replies.
//! Only the author may delete a ticket or message. Claps, ratings and
//! reactions go through [`crate::core::feedback`] and the denormalized
//! counters on the ticket and message rows are refreshed in the same
//! transaction.

use crate::{
    core::{
        account::{author_name, display_names},
        feedback::{
            self, RatingPolicy, RatingSummary, ReactionCounts, ReactionKind, TargetKind,
        },
    },
    entities::{Message, MessageColumn, Ticket, TicketColumn, message, ticket, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// A ticket as shown in the list and detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketView {
    /// Ticket id
    pub id: i64,
    /// Thread title
    pub title: String,
    /// Opening post
    pub description: String,
    /// Author display name
    pub author: String,
    /// Author user id
    pub user_id: i64,
    /// Number of claps
    pub claps: i64,
    /// Average rating
    pub rating: f64,
    /// Number of ratings
    pub rating_count: i64,
    /// Number of replies
    pub message_count: usize,
    /// When the ticket was opened
    pub created_at: DateTimeUtc,
}

/// A reply as shown under a ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    /// Message id
    pub id: i64,
    /// Reply text
    pub content: String,
    /// Author display name
    pub author: String,
    /// Author user id
    pub user_id: i64,
    /// Author's setup image when the message was posted
    pub setup_image: Option<String>,
    /// Number of likes
    pub likes: i64,
    /// Number of dislikes
    pub dislikes: i64,
    /// Average rating
    pub rating: f64,
    /// Number of ratings
    pub rating_count: i64,
    /// When the message was posted
    pub created_at: DateTimeUtc,
}

/// A ticket with all of its replies, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketDetail {
    /// The ticket
    #[serde(flatten)]
    pub ticket: TicketView,
    /// Its replies
    pub messages: Vec<MessageView>,
}

fn ticket_view(ticket: ticket::Model, author: String, message_count: usize) -> TicketView {
    TicketView {
        id: ticket.id,
        title: ticket.title,
        description: ticket.description,
        author,
        user_id: ticket.user_id,
        claps: ticket.claps,
        rating: ticket.rating,
        rating_count: ticket.rating_count,
        message_count,
        created_at: ticket.created_at,
    }
}

fn message_view(message: message::Model, author: String) -> MessageView {
    MessageView {
        id: message.id,
        content: message.content,
        author,
        user_id: message.user_id,
        setup_image: message.setup_image,
        likes: message.likes,
        dislikes: message.dislikes,
        rating: message.rating,
        rating_count: message.rating_count,
        created_at: message.created_at,
    }
}

async fn find_ticket<C>(db: &C, ticket_id: i64) -> Result<ticket::Model>
where
    C: ConnectionTrait,
{
    Ticket::find_by_id(ticket_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("ticket", ticket_id))
}

async fn find_message<C>(db: &C, ticket_id: i64, message_id: i64) -> Result<message::Model>
where
    C: ConnectionTrait,
{
    Message::find_by_id(message_id)
        .filter(MessageColumn::TicketId.eq(ticket_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("message", message_id))
}

/// All tickets, newest first.
pub async fn list_tickets(db: &DatabaseConnection) -> Result<Vec<TicketView>> {
    let tickets = Ticket::find()
        .order_by_desc(TicketColumn::CreatedAt)
        .order_by_desc(TicketColumn::Id)
        .all(db)
        .await?;

    let ticket_ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
    let mut message_counts: HashMap<i64, usize> = HashMap::new();
    if !ticket_ids.is_empty() {
        for message in Message::find()
            .filter(MessageColumn::TicketId.is_in(ticket_ids))
            .all(db)
            .await?
        {
            *message_counts.entry(message.ticket_id).or_default() += 1;
        }
    }

    let names = display_names(db, tickets.iter().map(|t| t.user_id)).await?;
    Ok(tickets
        .into_iter()
        .map(|ticket| {
            let author = author_name(&names, ticket.user_id);
            let count = message_counts.get(&ticket.id).copied().unwrap_or(0);
            ticket_view(ticket, author, count)
        })
        .collect())
}

/// Opens a new ticket.
///
/// # Errors
/// Returns [`Error::Validation`] when the title or description is blank.
pub async fn create_ticket(
    db: &DatabaseConnection,
    author: &user::Model,
    title: &str,
    description: &str,
) -> Result<TicketView> {
    let (title, description) = (title.trim(), description.trim());
    if title.is_empty() || description.is_empty() {
        return Err(Error::validation("Title and description are required"));
    }

    let ticket = ticket::ActiveModel {
        user_id: Set(author.id),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        claps: Set(0),
        rating: Set(0.0),
        rating_count: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("User {} opened ticket {}", author.id, ticket.id);
    Ok(ticket_view(ticket, author.display_name(), 0))
}

/// A ticket with its replies, oldest first.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown ticket.
pub async fn get_ticket(db: &DatabaseConnection, ticket_id: i64) -> Result<TicketDetail> {
    let ticket = find_ticket(db, ticket_id).await?;
    let messages = Message::find()
        .filter(MessageColumn::TicketId.eq(ticket_id))
        .order_by_asc(MessageColumn::CreatedAt)
        .order_by_asc(MessageColumn::Id)
        .all(db)
        .await?;

    let names = display_names(
        db,
        std::iter::once(ticket.user_id).chain(messages.iter().map(|m| m.user_id)),
    )
    .await?;

    let message_count = messages.len();
    let author = author_name(&names, ticket.user_id);
    Ok(TicketDetail {
        ticket: ticket_view(ticket, author, message_count),
        messages: messages
            .into_iter()
            .map(|message| {
                let author = author_name(&names, message.user_id);
                message_view(message, author)
            })
            .collect(),
    })
}

/// Deletes a ticket with its replies and all attached feedback.
///
/// # Errors
/// - [`Error::NotFound`] for an unknown ticket
/// - [`Error::Forbidden`] when `user_id` is not the author
pub async fn delete_ticket(db: &DatabaseConnection, user_id: i64, ticket_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let ticket = find_ticket(&txn, ticket_id).await?;
    if ticket.user_id != user_id {
        return Err(Error::Forbidden);
    }

    let message_ids: Vec<i64> = Message::find()
        .filter(MessageColumn::TicketId.eq(ticket_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    feedback::clear_feedback(&txn, TargetKind::Message, &message_ids).await?;
    feedback::clear_feedback(&txn, TargetKind::Ticket, &[ticket_id]).await?;
    Message::delete_many()
        .filter(MessageColumn::TicketId.eq(ticket_id))
        .exec(&txn)
        .await?;
    Ticket::delete_by_id(ticket_id).exec(&txn).await?;

    txn.commit().await?;
    info!("User {user_id} deleted ticket {ticket_id}");
    Ok(())
}

/// Adds a reply to a ticket.
///
/// # Errors
/// - [`Error::Validation`] for blank content
/// - [`Error::NotFound`] for an unknown ticket
pub async fn post_message(
    db: &DatabaseConnection,
    author: &user::Model,
    ticket_id: i64,
    content: &str,
) -> Result<MessageView> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::validation("Message cannot be empty"));
    }
    find_ticket(db, ticket_id).await?;

    let message = message::ActiveModel {
        ticket_id: Set(ticket_id),
        user_id: Set(author.id),
        content: Set(content.to_string()),
        setup_image: Set(author.setup_image.clone()),
        likes: Set(0),
        dislikes: Set(0),
        rating: Set(0.0),
        rating_count: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(message_view(message, author.display_name()))
}

/// Deletes a reply and its feedback.
///
/// # Errors
/// - [`Error::NotFound`] when the message is not under this ticket
/// - [`Error::Forbidden`] when `user_id` is not the author
pub async fn delete_message(
    db: &DatabaseConnection,
    user_id: i64,
    ticket_id: i64,
    message_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let message = find_message(&txn, ticket_id, message_id).await?;
    if message.user_id != user_id {
        return Err(Error::Forbidden);
    }

    feedback::clear_feedback(&txn, TargetKind::Message, &[message_id]).await?;
    Message::delete_by_id(message_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Claps for a ticket once and returns the new clap count.
///
/// # Errors
/// - [`Error::NotFound`] for an unknown ticket
/// - [`Error::Conflict`] when the user already clapped
pub async fn clap_ticket(db: &DatabaseConnection, user_id: i64, ticket_id: i64) -> Result<i64> {
    let txn = db.begin().await?;

    let ticket = find_ticket(&txn, ticket_id).await?;
    let counts =
        feedback::react(&txn, TargetKind::Ticket, ticket_id, user_id, ReactionKind::Clap).await?;

    let mut active: ticket::ActiveModel = ticket.into();
    active.claps = Set(counts.claps);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(counts.claps)
}

/// Rates a ticket, replacing the user's earlier score.
///
/// # Errors
/// - [`Error::Validation`] for a score outside 0 to 10
/// - [`Error::NotFound`] for an unknown ticket
pub async fn rate_ticket(
    db: &DatabaseConnection,
    user_id: i64,
    ticket_id: i64,
    value: f64,
) -> Result<RatingSummary> {
    feedback::validate_rating(value)?;
    let txn = db.begin().await?;

    let ticket = find_ticket(&txn, ticket_id).await?;
    let summary = feedback::rate(
        &txn,
        TargetKind::Ticket,
        ticket_id,
        user_id,
        value,
        RatingPolicy::Upsert,
    )
    .await?;

    let mut active: ticket::ActiveModel = ticket.into();
    active.rating = Set(summary.rating);
    active.rating_count = Set(summary.rating_count);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(summary)
}

/// Rates a reply. Each user may rate a reply only once.
///
/// # Errors
/// - [`Error::Validation`] for a score outside 0 to 10
/// - [`Error::NotFound`] when the message is not under this ticket
/// - [`Error::Conflict`] when the user already rated it
pub async fn rate_message(
    db: &DatabaseConnection,
    user_id: i64,
    ticket_id: i64,
    message_id: i64,
    value: f64,
) -> Result<RatingSummary> {
    feedback::validate_rating(value)?;
    let txn = db.begin().await?;

    let message = find_message(&txn, ticket_id, message_id).await?;
    let summary = feedback::rate(
        &txn,
        TargetKind::Message,
        message_id,
        user_id,
        value,
        RatingPolicy::Once,
    )
    .await?;

    let mut active: message::ActiveModel = message.into();
    active.rating = Set(summary.rating);
    active.rating_count = Set(summary.rating_count);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(summary)
}

/// Likes or dislikes a reply and returns the new totals.
///
/// # Errors
/// - [`Error::Validation`] for a clap
/// - [`Error::NotFound`] when the message is not under this ticket
pub async fn react_to_message(
    db: &DatabaseConnection,
    user_id: i64,
    ticket_id: i64,
    message_id: i64,
    kind: ReactionKind,
) -> Result<ReactionCounts> {
    if kind == ReactionKind::Clap {
        return Err(Error::validation("Messages can only be liked or disliked"));
    }
    let txn = db.begin().await?;

    let message = find_message(&txn, ticket_id, message_id).await?;
    let counts = feedback::react(&txn, TargetKind::Message, message_id, user_id, kind).await?;

    let mut active: message::ActiveModel = message.into();
    active.likes = Set(counts.likes);
    active.dislikes = Set(counts.dislikes);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(counts)
}
