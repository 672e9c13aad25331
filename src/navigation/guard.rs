use serde::Serialize;

use super::route::RouteMatch;

/// Authentication state of the caller, handed to every navigation.
///
/// Only the presence of a token is ever looked at. It is not decoded,
/// validated or checked for expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<String>,
}

impl AuthState {
    pub fn anonymous() -> Self {
        AuthState { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        AuthState {
            token: Some(token.into()),
        }
    }

    /// An empty stored string counts as no token at all.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Outcome of a single guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
    Block(String),
}

/// A guard runs before a navigation to a view completes.
pub trait NavigationGuard: Send + Sync {
    /// A descriptive name for the guard (for logs and redirect hops).
    fn name(&self) -> &str;

    /// Decides whether navigation to `to` may go ahead for `auth`.
    fn check(&self, to: &RouteMatch<'_>, auth: &AuthState) -> GuardDecision;
}

/// Sends navigations to protected routes to the login path when the caller
/// holds no token.
pub struct RequiresAuthGuard {
    login_path: String,
}

impl RequiresAuthGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        RequiresAuthGuard {
            login_path: login_path.into(),
        }
    }
}

impl NavigationGuard for RequiresAuthGuard {
    fn name(&self) -> &str {
        "requires-auth"
    }

    fn check(&self, to: &RouteMatch<'_>, auth: &AuthState) -> GuardDecision {
        if to.meta().requires_auth && !auth.is_authenticated() {
            GuardDecision::Redirect(self.login_path.clone())
        } else {
            GuardDecision::Allow
        }
    }
}
