//! Session resolution against the remote auth service.

use parking_lot::RwLock;
use tablegate_client::{CheckAuthResponse, User};
use tracing::{debug, info, warn};

use crate::error::{GateError, LOGIN_FAILED, Result};
use crate::service::{AuthResult, AuthService};

/// What the client knows about the visitor's session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No check has completed yet. Never a denial.
    #[default]
    Unknown,
    /// The server vouched for the session; carries its identity payload.
    Authenticated(User),
    /// No valid session, or it could not be verified.
    Unauthenticated,
}

impl SessionState {
    /// Check if the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Identity payload, if authenticated.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Outcome of one session check, before folding into [`SessionState`].
///
/// Keeps "the server said no" apart from "the server could not be asked".
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCheck {
    /// The server confirmed an active session.
    Active(User),
    /// The server answered: no session (`authenticated: false`, 401 or 403).
    Inactive,
    /// No verdict: transport failure, other error status or malformed body.
    Unverifiable(String),
}

impl SessionCheck {
    /// Classify the result of a `check-auth` request.
    pub fn from_response(result: AuthResult<CheckAuthResponse>) -> Self {
        match result {
            Ok(resp) if resp.authenticated => {
                SessionCheck::Active(resp.user.unwrap_or(User::Null))
            }
            Ok(_) => SessionCheck::Inactive,
            Err(e) if e.is_auth_error() => SessionCheck::Inactive,
            Err(e) => SessionCheck::Unverifiable(e.to_string()),
        }
    }

    /// Fold into the tri-state. Unverifiable counts as unauthenticated.
    pub fn into_state(self) -> SessionState {
        match self {
            SessionCheck::Active(user) => SessionState::Authenticated(user),
            SessionCheck::Inactive | SessionCheck::Unverifiable(_) => SessionState::Unauthenticated,
        }
    }

    /// Check if no verdict was reached.
    pub fn is_unverifiable(&self) -> bool {
        matches!(self, SessionCheck::Unverifiable(_))
    }
}

/// Resolves session validity by asking the auth service.
///
/// Holds the current [`SessionState`] but never answers from it: every
/// [`check_session`](Self::check_session) goes to the server.
pub struct SessionOracle<A> {
    auth: A,
    state: RwLock<SessionState>,
    unverifiable_retries: u32,
}

impl<A> std::fmt::Debug for SessionOracle<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOracle")
            .field("state", &*self.state.read())
            .field("unverifiable_retries", &self.unverifiable_retries)
            .finish()
    }
}

impl<A: AuthService> SessionOracle<A> {
    /// Create an oracle in the `Unknown` state.
    pub fn new(auth: A) -> Self {
        Self {
            auth,
            state: RwLock::new(SessionState::Unknown),
            unverifiable_retries: 0,
        }
    }

    /// Repeat checks that end `Unverifiable` up to `retries` more times.
    ///
    /// Zero (the default) makes exactly one request per check.
    pub fn with_unverifiable_retries(mut self, retries: u32) -> Self {
        self.unverifiable_retries = retries;
        self
    }

    /// The auth service this oracle queries.
    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Last resolved state. Does not contact the server.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Query the server and return the tagged outcome.
    pub async fn check(&self) -> SessionCheck {
        let mut outcome = SessionCheck::from_response(self.auth.check_auth().await);
        let mut retries = self.unverifiable_retries;
        while retries > 0 && outcome.is_unverifiable() {
            retries -= 1;
            debug!(?outcome, "Session check unverifiable, retrying");
            outcome = SessionCheck::from_response(self.auth.check_auth().await);
        }

        if let SessionCheck::Unverifiable(reason) = &outcome {
            warn!(%reason, "Could not verify session, treating as unauthenticated");
        }

        self.set_state(outcome.clone().into_state());
        outcome
    }

    /// Query the server and return the folded state. Never fails.
    pub async fn check_session(&self) -> SessionState {
        self.check().await.into_state()
    }

    /// Exchange an OAuth authorization code for a session.
    ///
    /// On success the state becomes `Authenticated`; on failure it is left
    /// as it was.
    pub async fn login(&self, code: &str) -> Result<User> {
        let response = self.auth.login(code).await.map_err(|e| {
            GateError::LoginRejected(
                e.service_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| LOGIN_FAILED.to_string()),
            )
        })?;

        if !response.success {
            return Err(GateError::LoginRejected(
                response.error.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ));
        }

        let user = response.user.unwrap_or(User::Null);
        info!("Login succeeded");
        self.set_state(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// End the session on the server.
    ///
    /// On success the state becomes `Unauthenticated`; on failure it is left
    /// as it was.
    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await.map_err(GateError::Logout)?;
        info!("Logged out");
        self.set_state(SessionState::Unauthenticated);
        Ok(())
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        if *state != next {
            debug!(from = ?*state, to = ?next, "Session state changed");
        }
        *state = next;
    }
}
