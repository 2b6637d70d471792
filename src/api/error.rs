//! HTTP mapping for [`Error`].

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

impl Error {
    /// Status code returned to clients for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidBudget { .. }
            | Self::InvalidWeights { .. }
            | Self::UnknownCategory { .. }
            | Self::InvalidToken
            | Self::TokenExpired => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Upstream { .. } | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable { .. } | Self::EmptyCandidates { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Json(_)
            | Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log
        let message = if status.is_server_error() {
            error!("Request failed: {self}");
            match status {
                StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
                _ => self.to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::part::Category;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidBudget { amount: -1.0 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::EmptyCandidates { category: Category::Gpu }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(Error::TokenExpired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::not_found("ticket", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Conflict { message: "dup".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Upstream { service: "Email", status: 500 }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::ServiceUnavailable { service: "Email" }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Config { message: "bad".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
