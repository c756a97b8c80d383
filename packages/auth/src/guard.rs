// ABOUTME: Route guard deciding whether a navigation may proceed
// ABOUTME: Redirects unauthenticated access to guarded paths to the tenant login page

use std::sync::Arc;

use tracing::{debug, warn};

use crate::notify::{Notice, Notifier};
use crate::session::SessionState;

pub const ROOT_PATH: &str = "/";
pub const ONBOARDING_PATH: &str = "/onboarding";
pub const LOGIN_PATH: &str = "/tenant-login";
pub const REDIRECT_PATH: &str = "/oidc/redirect";
pub const DASHBOARD_PATH: &str = "/dashboard";

pub const MSG_LOGIN_REQUIRED: &str = "Please login to access this page";

/// Where the user should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: String,
    /// Originally requested path, kept so login can return there.
    pub from: Option<String>,
    /// Replace the current history entry instead of pushing.
    pub replace: bool,
}

impl Navigation {
    pub fn push(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: None,
            replace: false,
        }
    }

    pub fn replace(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: None,
            replace: true,
        }
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to_login() -> Self {
        Self::replace(LOGIN_PATH)
    }

    pub fn to_dashboard() -> Self {
        Self::replace(DASHBOARD_PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Navigation),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Everything under `/dashboard` requires a session.
pub fn is_protected(path: &str) -> bool {
    let path = strip_query(path);
    path == DASHBOARD_PATH
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn suppresses_notice(path: &str) -> bool {
    strip_query(path) == LOGIN_PATH || path.contains(REDIRECT_PATH)
}

pub struct RouteGuard {
    session: SessionState,
    notifier: Arc<dyn Notifier>,
}

impl RouteGuard {
    pub fn new(session: SessionState, notifier: Arc<dyn Notifier>) -> Self {
        Self { session, notifier }
    }

    /// Decide a navigation to a guarded `path`.
    ///
    /// Without a non-empty access token the remaining session state is
    /// cleared and the user is sent to the login page with `path` as `from`.
    pub async fn guard(&self, path: &str) -> GuardDecision {
        if self.session.is_authenticated().await {
            return GuardDecision::Allow;
        }

        debug!("No session for {}, redirecting to login", path);
        if let Err(e) = self.session.clear_session().await {
            warn!("Failed to clear stale session: {}", e);
        }

        if !suppresses_notice(path) {
            self.notifier.notify(Notice::error(MSG_LOGIN_REQUIRED));
        }
        GuardDecision::Redirect(Navigation::to_login().from(path))
    }

    /// Decide any navigation; public paths always pass.
    pub async fn navigate(&self, path: &str) -> GuardDecision {
        if is_protected(path) {
            self.guard(path).await
        } else {
            GuardDecision::Allow
        }
    }

    /// Entering the login page while already signed in goes to the dashboard.
    pub async fn enter_login(&self) -> GuardDecision {
        if self.session.is_authenticated().await {
            GuardDecision::Redirect(Navigation::push(DASHBOARD_PATH))
        } else {
            GuardDecision::Allow
        }
    }
}
