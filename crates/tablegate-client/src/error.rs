//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response arrived (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not the expected JSON shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the server, if the body carried one.
        message: Option<String>,
    },

    /// The server rejected the session cookie (401).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Api { status: 401 | 403, .. })
    }

    /// The message the server reported, if any.
    ///
    /// Transport and decoding failures never carry one.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. } => message.as_deref(),
            Error::Auth(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the backend.
///
/// The routes report failures as `{"error": ...}`; the JWT layer in front of
/// them uses `{"msg": ...}`.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error.or(self.message).or(self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 500,
            message: Some("Server error".to_string()),
        };
        assert_eq!(err.to_string(), "API error (500): Server error");

        let err = Error::Api {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "API error (502): no message");
    }

    #[test]
    fn test_classification() {
        let err = Error::Api {
            status: 503,
            message: None,
        };
        assert!(!err.is_auth_error());
        assert_eq!(err.service_message(), None);

        let err = Error::Auth("Missing cookie".to_string());
        assert!(err.is_auth_error());
        assert_eq!(err.service_message(), Some("Missing cookie"));
    }

    #[test]
    fn test_error_response_prefers_error_field() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"error": "rate limited", "msg": "other"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("rate limited"));

        let body: ErrorResponse = serde_json::from_str(r#"{"msg": "Token has expired"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Token has expired"));

        let body: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.into_message(), None);
    }
}
