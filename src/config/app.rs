//! Application configuration loading from config.toml
//!
//! The file holds the server port, the builder's category weights and budget
//! presets, and token lifetimes. Every section is optional; missing values
//! fall back to the defaults below. Weights are validated here so a bad table
//! stops the server at startup instead of failing individual requests.

use crate::{
    core::{
        allocator::CategoryWeights,
        part::{Category, UNLIMITED_BUDGET},
    },
    errors::{Error, Result},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use tracing::{info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Builder weights and presets
    pub builder: BuilderConfig,
    /// Session and token lifetimes
    pub auth: AuthConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind on all interfaces
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Builder settings as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Share of the budget per category; must sum to 1.0
    pub weights: BTreeMap<Category, f64>,
    /// Budget shortcuts offered to the user
    pub presets: Vec<BudgetPreset>,
    /// Products requested per category when auto-building
    pub candidates_per_category: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default().iter().collect(),
            presets: default_presets(),
            candidates_per_category: crate::core::catalog::DEFAULT_LIMIT,
        }
    }
}

impl BuilderConfig {
    /// The validated weight table.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWeights`] when the table is invalid.
    pub fn category_weights(&self) -> Result<CategoryWeights> {
        CategoryWeights::new(self.weights.clone())
    }
}

/// A named budget shortcut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPreset {
    /// Display name
    pub name: String,
    /// Budget amount; the unlimited sentinel means "no limit"
    pub amount: f64,
    /// What this budget is good for
    pub description: String,
}

fn default_presets() -> Vec<BudgetPreset> {
    [
        ("Starter", 1000.0, "A solid PC for everyday needs"),
        ("Mid-range", 2000.0, "Great for gaming and work"),
        ("High-end", 3500.0, "High-end performance"),
        ("No limit", UNLIMITED_BUDGET, "The best of the best"),
    ]
    .into_iter()
    .map(|(name, amount, description)| BudgetPreset {
        name: name.to_string(),
        amount,
        description: description.to_string(),
    })
    .collect()
}

/// Session and token lifetimes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// How long a login session stays valid
    pub session_ttl_hours: i64,
    /// How long an email verification code stays valid
    pub verification_ttl_minutes: i64,
    /// How long a password reset link stays valid
    pub reset_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24 * 30,
            verification_ttl_minutes: 15,
            reset_ttl_minutes: 60,
        }
    }
}

impl AuthConfig {
    /// Session lifetime
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }

    /// Verification code lifetime
    #[must_use]
    pub const fn verification_ttl(&self) -> Duration {
        Duration::minutes(self.verification_ttl_minutes)
    }

    /// Reset token lifetime
    #[must_use]
    pub const fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.reset_ttl_minutes)
    }

    /// Rejects lifetimes that are not positive or do not fit a [`Duration`].
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("session_ttl_hours", self.session_ttl_hours, Duration::try_hours(self.session_ttl_hours)),
            (
                "verification_ttl_minutes",
                self.verification_ttl_minutes,
                Duration::try_minutes(self.verification_ttl_minutes),
            ),
            ("reset_ttl_minutes", self.reset_ttl_minutes, Duration::try_minutes(self.reset_ttl_minutes)),
        ];

        for (key, value, duration) in checks {
            if value <= 0 || duration.is_none() {
                return Err(Error::Config {
                    message: format!("auth.{key} must be a positive duration, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Parses configuration from TOML text and validates weights, presets and token lifetimes.
///
/// # Errors
/// Returns an error if the TOML is malformed or any section is invalid.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    config.builder.category_weights()?;
    for preset in &config.builder.presets {
        crate::core::part::Budget::from_amount(preset.amount)?;
    }
    config.auth.validate()?;

    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The category weights are invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Loads configuration from `CONFIG_PATH` (default ./config.toml).
///
/// A missing file is not an error: defaults are used and a warning is logged.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed or validated.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    if !Path::new(&path).exists() {
        warn!("Config file {path} not found, using built-in defaults");
        return Ok(AppConfig::default());
    }

    let config = load_config(&path)?;
    info!("Loaded configuration from {path}");
    Ok(config)
}
