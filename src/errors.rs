//! Unified error type for the PC Builder backend.
//!
//! Every fallible operation in `core`, `config` and `api` returns
//! [`Result`]. The HTTP layer maps each variant to a status code in
//! `api::error`.

use crate::core::part::Category;
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Database failure reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Outbound HTTP failure (retailer, chat or mail API)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// A price is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A total budget is zero, negative or not a finite number
    #[error("Invalid budget: {amount}")]
    InvalidBudget {
        /// The offending budget
        amount: f64,
    },

    /// Category weights are negative or do not sum to 1.0
    #[error("Invalid category weights: {message}")]
    InvalidWeights {
        /// What is wrong with the weight table
        message: String,
    },

    /// A category was supplied with no candidate parts
    #[error("No candidate parts available for category '{category}'")]
    EmptyCandidates {
        /// The category without candidates
        category: Category,
    },

    /// A category name that is not part of the build
    #[error("Unknown category '{name}'")]
    UnknownCategory {
        /// The name that failed to parse
        name: String,
    },

    /// Request input failed validation
    #[error("{message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// A row could not be found
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of row (e.g. "ticket")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The request carries no valid session
    #[error("Authentication required")]
    Unauthorized,

    /// The session user may not perform this action
    #[error("You do not have permission to do that")]
    Forbidden,

    /// Uniqueness rule violated (duplicate reaction, rating, email)
    #[error("{message}")]
    Conflict {
        /// Human-readable description
        message: String,
    },

    /// Email and password did not match
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Verification code or reset token does not match
    #[error("Invalid or unknown token")]
    InvalidToken,

    /// Verification code or reset token is past its expiry
    #[error("Token has expired")]
    TokenExpired,

    /// An external service has no credentials configured
    #[error("{service} is not configured")]
    ServiceUnavailable {
        /// Name of the external service
        service: &'static str,
    },

    /// An external service answered with a failure status
    #[error("{service} responded with status {status}")]
    Upstream {
        /// Name of the external service
        service: &'static str,
        /// HTTP status code returned
        status: u16,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
