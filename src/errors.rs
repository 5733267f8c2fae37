use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Request errors ───────────────────────────────────────────────────────
    #[error("{message}")]
    BadRequest { message: String },

    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("{reason}")]
    Unauthorized { reason: String },

    // ── Completion provider errors ───────────────────────────────────────────
    #[error("Completion provider unavailable at {host}")]
    ProviderUnavailable { host: String },

    #[error("Model '{model_name}' not found")]
    ModelNotFound { model_name: String },

    #[error("Completion failed: {message}")]
    ProviderFailure { message: String },

    #[error("Provider returned unusable output: {message}")]
    InvalidProviderOutput { message: String },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest { message: message.into() }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        AppError::Unauthorized { reason: reason.into() }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        AppError::ProviderFailure { message: message.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::BadRequest { .. } | AppError::MissingFields { .. })
    }

    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, AppError::ProviderUnavailable { .. })
    }

    pub fn status(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else if self.is_provider_unavailable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            match self {
                AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
                AppError::ModelNotFound { .. } => StatusCode::NOT_FOUND,
                AppError::ProviderFailure { .. } | AppError::InvalidProviderOutput { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::MissingFields { fields: vec!["industry"] }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::ProviderUnavailable { host: "h".into() }.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::ModelNotFound { model_name: "m".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::provider("x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Unexpected("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_fields_lists_every_field() {
        let err = AppError::MissingFields { fields: vec!["industry", "technology"] };
        assert_eq!(err.to_string(), "Missing required fields: industry, technology");
    }
}
