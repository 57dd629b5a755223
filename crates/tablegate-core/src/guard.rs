//! Route admission for protected views.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::service::AuthService;
use crate::session::{SessionOracle, SessionState};

/// Admission state of a guarded route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    /// The session check has not resolved. Show a placeholder.
    #[default]
    Checking,
    /// Render the protected content.
    Admitted,
    /// Redirect to the public entry point.
    Denied,
}

impl GuardState {
    /// Map a session state to an admission state. `Unknown` never denies.
    pub fn from_session(session: &SessionState) -> Self {
        match session {
            SessionState::Unknown => GuardState::Checking,
            SessionState::Authenticated(_) => GuardState::Admitted,
            SessionState::Unauthenticated => GuardState::Denied,
        }
    }
}

/// What a guarded route displays.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission<V> {
    /// Placeholder while the check is pending.
    Loading,
    /// The protected content.
    Render(V),
    /// Navigate to this path instead. Replaces the current history entry.
    Redirect(String),
}

/// Liveness flag shared between a view and its async work.
///
/// Once unmounted, results arriving for the view are dropped.
#[derive(Debug, Clone)]
pub struct Mount(Arc<AtomicBool>);

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Mount {
    /// A mounted view.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Mark the view as gone.
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Check if the view is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Gate placed in front of one protected view.
///
/// Each entry into the route runs a fresh session check; nothing is carried
/// over from an earlier visit.
#[derive(Debug)]
pub struct RouteGuard {
    state: RwLock<GuardState>,
    entry_point: String,
    mount: Mount,
}

impl RouteGuard {
    /// Create a guard that redirects denied visitors to `entry_point`.
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(GuardState::Checking),
            entry_point: entry_point.into(),
            mount: Mount::new(),
        }
    }

    /// The guarded view's liveness flag.
    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    /// Current admission state.
    pub fn state(&self) -> GuardState {
        *self.state.read()
    }

    /// Redirect target for denied navigation.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Apply a resolved session state. Ignored once unmounted.
    pub fn apply(&self, session: &SessionState) -> GuardState {
        if !self.mount.is_mounted() {
            debug!("Guard unmounted, dropping session result");
            return self.state();
        }
        let next = GuardState::from_session(session);
        *self.state.write() = next;
        next
    }

    /// Enter the route: reset to `Checking` and run one session check.
    pub async fn enter<A: AuthService>(&self, oracle: &SessionOracle<A>) -> GuardState {
        *self.state.write() = GuardState::Checking;
        let session = oracle.check_session().await;
        let state = self.apply(&session);
        match state {
            GuardState::Admitted => debug!("Route admitted"),
            GuardState::Denied => info!(redirect = %self.entry_point, "Route denied"),
            GuardState::Checking => {}
        }
        state
    }

    /// What to display for the current state.
    ///
    /// `content` is only invoked when admitted.
    pub fn render<V>(&self, content: impl FnOnce() -> V) -> Admission<V> {
        match self.state() {
            GuardState::Checking => Admission::Loading,
            GuardState::Admitted => Admission::Render(content()),
            GuardState::Denied => Admission::Redirect(self.entry_point.clone()),
        }
    }

    /// Enter the route and render it in one step.
    pub async fn protect<A, V>(
        &self,
        oracle: &SessionOracle<A>,
        content: impl FnOnce() -> V,
    ) -> Admission<V>
    where
        A: AuthService,
    {
        self.enter(oracle).await;
        self.render(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_session() {
        assert_eq!(GuardState::from_session(&SessionState::Unknown), GuardState::Checking);
        assert_eq!(
            GuardState::from_session(&SessionState::Authenticated(json!("u"))),
            GuardState::Admitted
        );
        assert_eq!(
            GuardState::from_session(&SessionState::Unauthenticated),
            GuardState::Denied
        );
    }

    #[test]
    fn test_checking_renders_placeholder_only() {
        let guard = RouteGuard::new("/");
        let mut rendered = false;
        let out = guard.render(|| {
            rendered = true;
        });
        assert_eq!(out, Admission::Loading);
        assert!(!rendered);
    }

    #[test]
    fn test_denied_redirects_to_entry_point() {
        let guard = RouteGuard::new("/welcome");
        guard.apply(&SessionState::Unauthenticated);
        assert_eq!(
            guard.render(|| "secret"),
            Admission::Redirect("/welcome".to_string())
        );
    }

    #[test]
    fn test_admitted_renders_content() {
        let guard = RouteGuard::new("/");
        guard.apply(&SessionState::Authenticated(json!({"email": "a@b.c"})));
        assert_eq!(guard.render(|| "listing"), Admission::Render("listing"));
    }

    #[test]
    fn test_unmounted_guard_ignores_results() {
        let guard = RouteGuard::new("/");
        guard.mount().unmount();
        assert_eq!(guard.apply(&SessionState::Unauthenticated), GuardState::Checking);
        assert_eq!(guard.state(), GuardState::Checking);
    }

    #[test]
    fn test_mount_is_shared() {
        let mount = Mount::new();
        let handle = mount.clone();
        assert!(handle.is_mounted());
        mount.unmount();
        assert!(!handle.is_mounted());
    }
}
