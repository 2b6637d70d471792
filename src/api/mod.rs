//! JSON HTTP API over axum.
//!
//! Handlers are thin: they extract input, call into [`crate::core`], and let
//! [`crate::errors::Error`] render itself as a status code with an
//! `{"error": ...}` body.

use crate::{
    config::{app::AppConfig, services::ServicesConfig},
    core::{
        allocator::CategoryWeights,
        catalog::{CatalogSource, RetailerCatalog},
        chat::{ChatClient, chat_from_config},
        mailer::{Mailer, mailer_from_config},
    },
    errors::{Error, Result},
};
use axum::{
    Router,
    http::{Method, header},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Bearer-token authentication and account endpoints
pub mod auth;
/// Budget builder endpoints
pub mod builder;
/// Product listing and availability endpoints
pub mod catalog;
/// AI assistant endpoint
pub mod chat;
/// Status code mapping for application errors
pub mod error;
/// Forum endpoints
pub mod forum;
/// Liveness and configuration report
pub mod health;
/// Setup showcase endpoints
pub mod showcase;

#[cfg(test)]
mod tests;

/// Which optional services have credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStatus {
    /// AI assistant key present
    pub chat: bool,
    /// Mail key present
    pub mail: bool,
    /// Retailer proxy token present
    pub retailer_token: bool,
}

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Settings from config.toml
    pub config: AppConfig,
    /// Validated builder weights
    pub weights: CategoryWeights,
    /// Product source for the builder and listing endpoints
    pub catalog: Arc<dyn CatalogSource>,
    /// AI assistant
    pub chat: Arc<dyn ChatClient>,
    /// Outgoing email
    pub mailer: Arc<dyn Mailer>,
    /// Public site URL for emailed links
    pub public_url: String,
    /// Configured services, for the health report
    pub services: ServiceStatus,
}

/// Shared state type used by every handler.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wires the real external service clients from configuration.
    ///
    /// # Errors
    /// Returns an error if the builder weights are invalid or the HTTP client
    /// cannot be built.
    pub fn new(db: DatabaseConnection, config: AppConfig, services: ServicesConfig) -> Result<Self> {
        let weights = config.builder.category_weights()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let status = ServiceStatus {
            chat: services.chat.is_some(),
            mail: services.mail.is_some(),
            retailer_token: services.retailer.token.is_some(),
        };

        Ok(Self {
            db,
            config,
            weights,
            catalog: Arc::new(RetailerCatalog::new(client.clone(), services.retailer)),
            chat: chat_from_config(client.clone(), services.chat),
            mailer: mailer_from_config(client, services.mail),
            public_url: services.public_url,
            services: status,
        })
    }
}

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    let forum_routes = Router::new()
        .route("/tickets", get(forum::list_tickets).post(forum::create_ticket))
        .route(
            "/tickets/:id",
            get(forum::get_ticket).delete(forum::delete_ticket),
        )
        .route("/tickets/:id/clap", post(forum::clap_ticket))
        .route("/tickets/:id/rating", post(forum::rate_ticket))
        .route("/tickets/:id/messages", post(forum::post_message))
        .route(
            "/tickets/:id/messages/:message_id",
            delete(forum::delete_message),
        )
        .route(
            "/tickets/:id/messages/:message_id/rating",
            post(forum::rate_message),
        )
        .route(
            "/tickets/:id/messages/:message_id/reaction",
            post(forum::react_to_message),
        );

    let setup_routes = Router::new()
        .route("/", get(showcase::list_setups).post(showcase::create_setup))
        .route(
            "/:id",
            get(showcase::get_setup).delete(showcase::delete_setup),
        )
        .route("/:id/reaction", post(showcase::react_to_setup))
        .route("/:id/rating", post(showcase::rate_setup))
        .route("/:id/comments", post(showcase::add_comment))
        .route(
            "/:id/comments/:comment_id",
            delete(showcase::delete_comment),
        )
        .route(
            "/:id/comments/:comment_id/reaction",
            post(showcase::react_to_comment),
        )
        .route(
            "/:id/comments/:comment_id/rating",
            post(showcase::rate_comment),
        );

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/verify", post(auth::verify))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/request-verification", post(auth::request_verification))
        .route("/setup-image", post(auth::set_setup_image))
        .route("/me", get(auth::me));

    let builder_routes = Router::new()
        .route("/presets", get(builder::presets))
        .route("/auto", post(builder::auto_build))
        .route("/options", post(builder::options))
        .route("/select", post(builder::select));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/products", get(catalog::products))
        .route("/check-availability", get(catalog::check_availability))
        .route("/chat", post(chat::chat))
        .nest("/builder", builder_routes)
        .nest("/auth", auth_routes)
        .nest("/forum", forum_routes)
        .nest("/setups", setup_routes);

    Router::new().nest("/api", api).with_state(state)
}

/// Binds the port from config and serves until Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(state: SharedState) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let address = format!("0.0.0.0:{}", state.config.server.port);
    let app = router(state).layer(cors).layer(TraceLayer::new_for_http());

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
