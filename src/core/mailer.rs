//! Outgoing transactional email.
//!
//! Account flows depend on the [`Mailer`] trait only. [`ResendMailer`] delivers
//! through the Resend HTTP API; [`DisabledMailer`] stands in when no API key is
//! configured and fails every send with [`Error::ServiceUnavailable`].

use crate::{
    config::services::MailConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

/// A message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

impl OutgoingEmail {
    /// Email carrying a 6-digit verification code.
    #[must_use]
    pub fn verification(to: &str, name: &str, code: &str, valid_minutes: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your email address".to_string(),
            html: format!(
                "<p>Hi {name},</p>\
                 <p>Your verification code is:</p>\
                 <h2 style=\"letter-spacing:4px\">{code}</h2>\
                 <p>The code is valid for {valid_minutes} minutes.</p>"
            ),
        }
    }

    /// Email carrying a password reset link.
    #[must_use]
    pub fn password_reset(to: &str, name: &str, link: &str, valid_minutes: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            html: format!(
                "<p>Hi {name},</p>\
                 <p>Click the link below to choose a new password:</p>\
                 <p><a href=\"{link}\">{link}</a></p>\
                 <p>The link is valid for {valid_minutes} minutes. \
                 If you did not request a reset, ignore this email.</p>"
            ),
        }
    }
}

/// Delivers email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Mailer used when email is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        debug!("Dropping email to {}: mail is not configured", email.to);
        Err(Error::ServiceUnavailable { service: "Email" })
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Mailer backed by the Resend API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl ResendMailer {
    /// Creates a mailer with the given credentials.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: MailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let body = ResendRequest {
            from: &self.config.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                service: "Email",
                status: status.as_u16(),
            });
        }

        info!("Sent '{}' email to {}", email.subject, email.to);
        Ok(())
    }
}

/// Picks the real mailer when configured, the disabled one otherwise.
#[must_use]
pub fn mailer_from_config(
    client: reqwest::Client,
    config: Option<MailConfig>,
) -> std::sync::Arc<dyn Mailer> {
    match config {
        Some(config) => std::sync::Arc::new(ResendMailer::new(client, config)),
        None => std::sync::Arc::new(DisabledMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_contains_code() {
        let email = OutgoingEmail::verification("ana@example.com", "Ana", "123456", 15);
        assert_eq!(email.to, "ana@example.com");
        assert!(email.html.contains("123456"));
        assert!(email.html.contains("15 minutes"));
    }

    #[test]
    fn test_reset_email_contains_link() {
        let link = "http://localhost:3000/auth/reset-password?token=abc&email=ana%40example.com";
        let email = OutgoingEmail::password_reset("ana@example.com", "Ana", link, 60);
        assert!(email.html.contains(link));
    }

    #[tokio::test]
    async fn test_disabled_mailer_reports_unavailable() {
        let email = OutgoingEmail::verification("ana@example.com", "Ana", "123456", 15);
        let result = DisabledMailer.send(email).await;
        assert!(matches!(
            result,
            Err(Error::ServiceUnavailable { service: "Email" })
        ));
    }
}
