use super::{ServiceStatus, SharedState};
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: bool,
    services: ServicesReport,
}

#[derive(Debug, Serialize)]
struct ServicesReport {
    chat: bool,
    mail: bool,
    retailer_token: bool,
}

impl From<ServiceStatus> for ServicesReport {
    fn from(status: ServiceStatus) -> Self {
        Self {
            chat: status.chat,
            mail: status.mail,
            retailer_token: status.retailer_token,
        }
    }
}

/// Reports liveness, database reachability and which services are configured.
///
/// Always answers 200 while the process is up; `status` turns `"degraded"`
/// when the database does not respond.
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let database = state
        .db
        .ping()
        .await
        .inspect_err(|e| warn!("Database ping failed: {e}"))
        .is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        services: state.services.into(),
    })
}
