//! Shared test utilities for the PC builder.
//!
//! This module provides helpers for setting up test databases, creating rows
//! with sensible defaults, and in-process stand-ins for the external services.

use crate::{
    core::{
        catalog::CatalogSource,
        fallback::fallback_parts,
        chat::ChatClient,
        forum,
        mailer::{Mailer, OutgoingEmail},
        part::{Category, Part},
        showcase,
    },
    entities::user,
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

/// Password given to every user made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "password1";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a verified user whose password is [`TEST_PASSWORD`].
///
/// Uses the minimum bcrypt cost to keep tests fast.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
) -> Result<user::Model> {
    user::ActiveModel {
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        password_hash: Set(bcrypt::hash(TEST_PASSWORD, 4)?),
        email_verified_at: Set(Some(Utc::now())),
        setup_image: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A user model that was never stored, for validation-only paths.
#[must_use]
pub fn detached_user(id: i64, name: &str) -> user::Model {
    user::Model {
        id,
        email: format!("user{id}@example.com"),
        name: name.to_string(),
        password_hash: String::new(),
        email_verified_at: None,
        setup_image: None,
        created_at: Utc::now(),
    }
}

/// Creates a ticket with a default description.
pub async fn create_test_ticket(
    db: &DatabaseConnection,
    author: &user::Model,
    title: &str,
) -> Result<forum::TicketView> {
    forum::create_ticket(db, author, title, "Test description").await
}

/// Creates a setup with a default description and image.
pub async fn create_test_setup(
    db: &DatabaseConnection,
    owner: &user::Model,
    title: &str,
) -> Result<showcase::SetupView> {
    showcase::create_setup(
        db,
        owner,
        title,
        "Test description",
        "https://images.example.com/setup.jpg",
    )
    .await
}

/// Catalog serving fixed lists; unknown categories come back empty.
#[derive(Debug, Clone, Default)]
pub struct FixedCatalog {
    parts: BTreeMap<Category, Vec<Part>>,
}

impl FixedCatalog {
    /// Creates a catalog from per-category lists.
    #[must_use]
    pub const fn new(parts: BTreeMap<Category, Vec<Part>>) -> Self {
        Self { parts }
    }
}

#[async_trait]
impl CatalogSource for FixedCatalog {
    async fn fetch_category(&self, category: Category, limit: usize) -> Result<Vec<Part>> {
        Ok(self
            .parts
            .get(&category)
            .map(|parts| parts.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Catalog serving the built-in fallback table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_category(&self, category: Category, limit: usize) -> Result<Vec<Part>> {
        Ok(fallback_parts(category).into_iter().take(limit).collect())
    }
}

/// Catalog that always fails like an unreachable retailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCatalog;

#[async_trait]
impl CatalogSource for FailingCatalog {
    async fn fetch_category(&self, _category: Category, _limit: usize) -> Result<Vec<Part>> {
        Err(Error::Upstream {
            service: "retailer catalog",
            status: 503,
        })
    }
}

/// Mailer that keeps every message in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl RecordingMailer {
    /// Everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn last_match(&self, pattern: &str) -> Option<String> {
        let pattern = Regex::new(pattern).ok()?;
        let last = self.sent().pop()?;
        pattern
            .captures(&last.html)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Verification code from the latest email.
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.last_match(r">(\d{6})<")
    }

    /// Reset token from the latest email.
    #[must_use]
    pub fn last_reset_token(&self) -> Option<String> {
        self.last_match(r"token=([0-9a-f]{64})")
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

/// Chat client that echoes the message back.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeChat;

#[async_trait]
impl ChatClient for FakeChat {
    async fn reply(&self, message: &str) -> Result<String> {
        Ok(format!("echo: {message}"))
    }
}
