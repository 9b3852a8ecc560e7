//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other 4xx, usually bad form input
    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and response body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status.as_u16() {
            401 => Self::Unauthenticated(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            code @ 400..=499 => Self::Validation {
                status: code,
                message,
            },
            code => Self::Server {
                status: code,
                message,
            },
        }
    }

    /// HTTP status carried by the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::Serialization(_) | Self::Configuration(_) => None,
        }
    }

    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    /// Client-side rejection other than authentication
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Forbidden(_) | Self::NotFound(_) | Self::Validation { .. }
        )
    }
}

/// Prefer the API's `detail` field, then the raw body, then the status reason
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_string)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses_to_variants() {
        assert!(ClientError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthenticated());
        assert!(matches!(
            ClientError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "{}"),
            ClientError::Validation { status: 422, .. }
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ClientError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn surfaces_detail_field() {
        let err = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Invalid credentials"}"#,
        );
        assert_eq!(err.to_string(), "Request rejected (400): Invalid credentials");
        assert!(err.is_validation());
    }

    #[test]
    fn falls_back_to_reason_phrase() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "  ");
        assert_eq!(err.to_string(), "Resource not found: Not Found");
        assert_eq!(err.status(), Some(404));
    }
}
