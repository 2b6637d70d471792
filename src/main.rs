use dotenvy::dotenv;
use pc_builder::{
    api::{self, AppState},
    config::{app::load_app_configuration, database, services::load_services_config},
    errors::Result,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml (builder weights, presets, auth lifetimes)
    let app_config = load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect to the database and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. External services come from the environment only
    let services = load_services_config();
    if services.chat.is_none() {
        info!("CHAT_API_KEY not set, AI assistant disabled.");
    }
    if services.mail.is_none() {
        info!("RESEND_API_KEY not set, registration and password reset emails disabled.");
    }

    // 6. Serve the API
    let state = AppState::new(db, app_config, services)
        .inspect_err(|e| error!("Failed to build application state: {}", e))?;
    api::serve(Arc::new(state)).await
}
