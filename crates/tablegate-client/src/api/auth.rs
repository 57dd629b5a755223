//! Auth API.

use crate::client::GateClient;
use crate::error::Result;
use crate::types::{CheckAuthResponse, GoogleLoginRequest, LoginResponse, LogoutResponse};

/// Auth API client.
///
/// All three endpoints rely on the session cookie rather than an explicit
/// credential argument.
pub struct AuthApi {
    client: GateClient,
}

impl AuthApi {
    pub(crate) fn new(client: GateClient) -> Self {
        Self { client }
    }

    /// Ask the server whether the current session cookie is valid.
    pub async fn check(&self) -> Result<CheckAuthResponse> {
        self.client.get("auth/check-auth").await
    }

    /// Exchange an OAuth authorization code for a session cookie.
    pub async fn google_login(&self, code: impl Into<String>) -> Result<LoginResponse> {
        let request = GoogleLoginRequest { code: code.into() };
        self.client.post("auth/google_login", &request).await
    }

    /// End the session. The server clears the cookie.
    pub async fn logout(&self) -> Result<LogoutResponse> {
        self.client
            .post("auth/logout", &serde_json::json!({}))
            .await
    }
}
