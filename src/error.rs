use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for Keyway operations.
///
/// Domain errors (`AlreadyEnrolled`, `InvalidCode`, ...) are recoverable at
/// the caller boundary and map to 4xx responses. `StoreUnavailable` and
/// `Internal` are infrastructure failures; their details are logged
/// server-side but hidden from clients.
#[derive(Debug, thiserror::Error)]
pub enum KeywayError {
    #[error("Identity is already enrolled")]
    AlreadyEnrolled,

    #[error("Unknown identity")]
    UnknownIdentity,

    #[error("Invalid authentication code")]
    InvalidCode,

    #[error("Invalid TOTP secret: {0}")]
    InvalidSecret(String),

    #[error("Duplicate identity")]
    DuplicateIdentity,

    #[error("Session token expired")]
    TokenExpired,

    #[error("Invalid session token: {0}")]
    TokenInvalid(String),

    #[error("Identity store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Standard error response format for API errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl KeywayError {
    pub fn invalid_secret(msg: impl Into<String>) -> Self {
        Self::InvalidSecret(msg.into())
    }

    pub fn token_invalid(msg: impl Into<String>) -> Self {
        Self::TokenInvalid(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::AlreadyEnrolled | Self::DuplicateIdentity => StatusCode::CONFLICT,
            Self::UnknownIdentity => StatusCode::NOT_FOUND,
            Self::InvalidCode | Self::TokenExpired | Self::TokenInvalid(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::InvalidSecret(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a safe error message suitable for client responses.
    ///
    /// Domain errors (4xx) expose their message since the user needs to know
    /// what went wrong. Infrastructure errors return a generic message to
    /// prevent information disclosure; the full error is logged server-side.
    fn safe_message(&self) -> String {
        match self {
            Self::AlreadyEnrolled
            | Self::UnknownIdentity
            | Self::InvalidCode
            | Self::InvalidSecret(_)
            | Self::DuplicateIdentity
            | Self::TokenExpired
            | Self::TokenInvalid(_) => self.to_string(),

            Self::StoreUnavailable(_) => "Identity store unavailable".to_string(),
            Self::Config(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for KeywayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        // Full error details go to the server log, never to the client
        tracing::error!(
            status = status.as_u16(),
            error_id = %error_id,
            error = %self,
            "Request failed"
        );

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for Keyway operations.
pub type Result<T> = std::result::Result<T, KeywayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            KeywayError::AlreadyEnrolled.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            KeywayError::DuplicateIdentity.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            KeywayError::UnknownIdentity.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            KeywayError::InvalidCode.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            KeywayError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            KeywayError::token_invalid("bad signature").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            KeywayError::invalid_secret("empty").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_error_status_codes() {
        assert_eq!(
            KeywayError::store_unavailable("connection refused").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            KeywayError::internal("oops").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_safe_message_exposes_domain_errors() {
        assert_eq!(
            KeywayError::AlreadyEnrolled.safe_message(),
            "Identity is already enrolled"
        );
        assert_eq!(
            KeywayError::InvalidCode.safe_message(),
            "Invalid authentication code"
        );
        assert_eq!(
            KeywayError::TokenExpired.safe_message(),
            "Session token expired"
        );
    }

    #[test]
    fn test_safe_message_hides_infrastructure_details() {
        assert_eq!(
            KeywayError::store_unavailable("db-prod-01:27017 unreachable").safe_message(),
            "Identity store unavailable"
        );
        assert_eq!(
            KeywayError::internal("signing key file missing at /etc/keyway").safe_message(),
            "Internal server error"
        );
    }

    #[tokio::test]
    async fn test_into_response_hides_store_details() {
        let err = KeywayError::store_unavailable("mongodb://secret-host unreachable");
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Identity store unavailable");
        assert!(!json["error"].as_str().unwrap().contains("secret-host"));
        assert!(!json["error_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_into_response_invalid_code() {
        let response = KeywayError::InvalidCode.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
