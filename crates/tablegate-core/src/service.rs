//! Seams to the remote services.
//!
//! The gate talks to the backend only through these traits, so tests and
//! alternative transports can stand in for [`GateClient`].

use std::sync::Arc;

use async_trait::async_trait;
use tablegate_client::{CheckAuthResponse, GateClient, LoginResponse, LogoutResponse, Restaurant};
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// The dataset a protected listing view renders.
pub type Dataset = Vec<Restaurant>;

/// Result type of the auth service calls.
pub type AuthResult<T> = tablegate_client::Result<T>;

/// The remote authentication service. Credentials travel as cookies.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// `GET /auth/check-auth`.
    async fn check_auth(&self) -> AuthResult<CheckAuthResponse>;

    /// `POST /auth/google_login`.
    async fn login(&self, code: &str) -> AuthResult<LoginResponse>;

    /// `POST /auth/logout`.
    async fn logout(&self) -> AuthResult<LogoutResponse>;
}

/// The remote data-fetch service.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the dataset, normalizing every failure into a [`FetchError`].
    async fn fetch_dataset(&self) -> FetchResult<Dataset>;
}

#[async_trait]
impl AuthService for GateClient {
    async fn check_auth(&self) -> AuthResult<CheckAuthResponse> {
        self.auth().check().await
    }

    async fn login(&self, code: &str) -> AuthResult<LoginResponse> {
        self.auth().google_login(code).await
    }

    async fn logout(&self) -> AuthResult<LogoutResponse> {
        self.auth().logout().await
    }
}

#[async_trait]
impl DatasetSource for GateClient {
    async fn fetch_dataset(&self) -> FetchResult<Dataset> {
        let response = self.scrape().restaurants().await?;
        if response.success {
            debug!(count = response.restaurants.len(), "Fetched restaurant data");
            Ok(response.restaurants)
        } else {
            Err(FetchError::service(response.error))
        }
    }
}

#[async_trait]
impl<T: AuthService + ?Sized> AuthService for Arc<T> {
    async fn check_auth(&self) -> AuthResult<CheckAuthResponse> {
        (**self).check_auth().await
    }

    async fn login(&self, code: &str) -> AuthResult<LoginResponse> {
        (**self).login(code).await
    }

    async fn logout(&self) -> AuthResult<LogoutResponse> {
        (**self).logout().await
    }
}

#[async_trait]
impl<T: DatasetSource + ?Sized> DatasetSource for Arc<T> {
    async fn fetch_dataset(&self) -> FetchResult<Dataset> {
        (**self).fetch_dataset().await
    }
}
