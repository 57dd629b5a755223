//! Error types for the gate.

use tablegate_client::Error as ClientError;

/// Reason shown when the backend reports failure without a message.
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch restaurant data";

/// Reason shown when a transport failure has no description.
pub const CONNECTION_ERROR: &str = "Error connecting to server";

/// Reason shown when login fails without a server message.
pub const LOGIN_FAILED: &str = "Authentication failed";

/// Why a dataset load failed.
///
/// `Display` is the human-readable reason the view shows; it is exactly the
/// service's message when the service reported one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The backend answered with a well-formed failure.
    #[error("{0}")]
    Service(String),

    /// No usable response: unreachable, timed out, bad status or bad body.
    #[error("{0}")]
    Transport(String),

    /// This view already has a load outstanding.
    #[error("a load is already in progress")]
    InFlight,
}

impl FetchError {
    /// The human-readable reason.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Build a service failure, falling back to the generic reason.
    pub fn service(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => FetchError::Service(m),
            _ => FetchError::Service(DEFAULT_FETCH_ERROR.to_string()),
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        if let Some(message) = err.service_message().filter(|m| !m.trim().is_empty()) {
            return FetchError::Service(message.to_string());
        }

        let description = match &err {
            ClientError::Api { status, .. } => format!("HTTP error! Status: {}", status),
            ClientError::Json(e) => format!("Malformed response: {}", e),
            other => other.to_string(),
        };

        if description.trim().is_empty() {
            FetchError::Transport(CONNECTION_ERROR.to_string())
        } else {
            FetchError::Transport(description)
        }
    }
}

/// Result of a dataset load.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors from explicit session transitions (login, logout).
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The auth service refused the login.
    #[error("{0}")]
    LoginRejected(String),

    /// The logout request failed; the session is unchanged.
    #[error("Logout failed: {0}")]
    Logout(#[source] ClientError),
}

/// Result type for session transitions.
pub type Result<T> = std::result::Result<T, GateError>;
