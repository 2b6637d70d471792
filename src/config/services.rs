//! External service configuration loaded from environment variables.
//!
//! Every service is optional. A missing key disables the matching feature
//! instead of failing startup; handlers report the service as unavailable.

/// Default retailer catalog endpoint
pub const DEFAULT_RETAILER_URL: &str = "https://www.bigbang.hr/api/nuxtapi/catalog/products/";

/// Default OpenAI-compatible chat completions endpoint
pub const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default transactional email endpoint
pub const DEFAULT_MAIL_URL: &str = "https://api.resend.com/emails";

/// Retailer catalog endpoint, optionally behind an authenticated proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerConfig {
    /// Catalog or proxy URL
    pub url: String,
    /// Bearer token sent to the proxy, if any
    pub token: Option<String>,
}

/// Chat model provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Chat completions URL
    pub url: String,
    /// Provider API key
    pub api_key: String,
    /// Model identifier
    pub model: String,
}

/// Outgoing mail settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// Send endpoint
    pub url: String,
    /// Provider API key
    pub api_key: String,
    /// Sender address
    pub from: String,
}

/// All external services
#[derive(Debug, Clone)]
pub struct ServicesConfig {
    /// Product catalog
    pub retailer: RetailerConfig,
    /// AI assistant; `None` when `CHAT_API_KEY` is unset
    pub chat: Option<ChatConfig>,
    /// Email delivery; `None` when `RESEND_API_KEY` is unset
    pub mail: Option<MailConfig>,
    /// Public site URL used in emailed links
    pub public_url: String,
}

/// Reads a variable, treating blank values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Gets the retailer configuration from `RETAILER_PROXY_URL` and `RETAILER_PROXY_TOKEN`.
#[must_use]
pub fn get_retailer_config() -> RetailerConfig {
    RetailerConfig {
        url: non_empty_var("RETAILER_PROXY_URL").unwrap_or_else(|| DEFAULT_RETAILER_URL.to_string()),
        token: non_empty_var("RETAILER_PROXY_TOKEN"),
    }
}

/// Gets the chat configuration from `CHAT_API_KEY`, `CHAT_API_URL` and `CHAT_MODEL`.
#[must_use]
pub fn get_chat_config() -> Option<ChatConfig> {
    non_empty_var("CHAT_API_KEY").map(|api_key| ChatConfig {
        url: non_empty_var("CHAT_API_URL").unwrap_or_else(|| DEFAULT_CHAT_URL.to_string()),
        api_key,
        model: non_empty_var("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
    })
}

/// Gets the mail configuration from `RESEND_API_KEY` and `RESEND_FROM`.
#[must_use]
pub fn get_mail_config() -> Option<MailConfig> {
    non_empty_var("RESEND_API_KEY").map(|api_key| MailConfig {
        url: DEFAULT_MAIL_URL.to_string(),
        api_key,
        from: non_empty_var("RESEND_FROM")
            .unwrap_or_else(|| "PC Builder <onboarding@resend.dev>".to_string()),
    })
}

/// Loads every external service setting from the environment.
#[must_use]
pub fn load_services_config() -> ServicesConfig {
    ServicesConfig {
        retailer: get_retailer_config(),
        chat: get_chat_config(),
        mail: get_mail_config(),
        public_url: non_empty_var("PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string()),
    }
}
