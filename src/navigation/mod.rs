//! Client route table and navigation resolution.
//!
//! A navigation starts at a requested location and follows record redirects
//! and guard redirects until it settles on a view. The caller's
//! [`AuthState`] is passed in on every call, so resolution is a pure
//! function of the table, the guards and that state.

pub mod guard;
pub mod route;
pub mod table;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub use self::guard::{AuthState, GuardDecision, NavigationGuard, RequiresAuthGuard};
pub use self::route::{RouteConfig, RouteEntry, RouteMatch, RouteMeta, RouteTarget};
pub use self::table::{RouteTable, RouteTableError};

/// Redirect chains longer than this are treated as a loop.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("navigation to '{path}' blocked by guard '{guard}': {reason}")]
    Blocked {
        path: String,
        guard: String,
        reason: String,
    },
    #[error("navigation to '{0}' exceeded the redirect limit")]
    RedirectLoop(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "guard", rename_all = "lowercase")]
pub enum RedirectReason {
    Record,
    Guard(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub from: String,
    pub to: String,
    pub reason: RedirectReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedView {
    pub path: String,
    pub name: Option<String>,
    pub component: String,
}

/// Where a navigation ended up, and how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub requested: String,
    pub final_path: String,
    pub view: ResolvedView,
    pub params: HashMap<String, String>,
    pub redirects: Vec<Hop>,
}

impl Resolution {
    pub fn redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Splits a location into path, query and fragment (without `?` and `#`).
pub fn split_location(location: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match location.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (location, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    let path = if path.is_empty() { "/" } else { path };
    (path, query, fragment)
}

fn join_location(path: &str, query: Option<&str>, fragment: Option<&str>) -> String {
    let mut location = path.to_string();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        location.push('#');
        location.push_str(fragment);
    }
    location
}

/// Resolves navigations against the route table and its guards.
pub struct Navigator {
    table: RouteTable,
    guards: Vec<Box<dyn NavigationGuard>>,
}

impl Navigator {
    pub fn new(table: RouteTable, guards: Vec<Box<dyn NavigationGuard>>) -> Self {
        info!(
            "Navigator ready with guards: [{}]",
            guards
                .iter()
                .map(|g| g.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Navigator { table, guards }
    }

    /// A navigator with the single auth guard redirecting to `login_path`.
    pub fn with_auth_guard(table: RouteTable, login_path: &str) -> Self {
        Self::new(table, vec![Box::new(RequiresAuthGuard::new(login_path))])
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolves `location` for the given caller.
    ///
    /// Record redirects keep the query and fragment of the location being
    /// redirected. Guard redirects start over with the guard's target only.
    pub fn resolve(&self, location: &str, auth: &AuthState) -> Result<Resolution, NavigationError> {
        let (path, query, fragment) = split_location(location);
        let mut path = path.to_string();
        let mut query = query.map(str::to_string);
        let mut fragment = fragment.map(str::to_string);
        let mut redirects: Vec<Hop> = Vec::new();

        loop {
            if redirects.len() > MAX_REDIRECTS {
                return Err(NavigationError::RedirectLoop(location.to_string()));
            }

            let found = self
                .table
                .find(&path)
                .ok_or_else(|| NavigationError::NotFound(path.clone()))?;

            let component = match &found.entry.target {
                RouteTarget::Redirect { to } => {
                    let (to_path, to_query, to_fragment) = split_location(to);
                    redirects.push(Hop {
                        from: path.clone(),
                        to: to.clone(),
                        reason: RedirectReason::Record,
                    });
                    path = to_path.to_string();
                    if to_query.is_some() {
                        query = to_query.map(str::to_string);
                    }
                    if to_fragment.is_some() {
                        fragment = to_fragment.map(str::to_string);
                    }
                    continue;
                }
                RouteTarget::View { component } => component,
            };

            let mut redirected_to: Option<String> = None;
            for guard in &self.guards {
                match guard.check(&found, auth) {
                    GuardDecision::Allow => {}
                    GuardDecision::Redirect(to) => {
                        debug!(
                            "Guard '{}' redirected navigation from '{}' to '{}'",
                            guard.name(),
                            path,
                            to
                        );
                        redirects.push(Hop {
                            from: path.clone(),
                            to: to.clone(),
                            reason: RedirectReason::Guard(guard.name().to_string()),
                        });
                        redirected_to = Some(to);
                        break;
                    }
                    GuardDecision::Block(reason) => {
                        debug!("Guard '{}' blocked navigation to '{}'", guard.name(), path);
                        return Err(NavigationError::Blocked {
                            path: path.clone(),
                            guard: guard.name().to_string(),
                            reason,
                        });
                    }
                }
            }

            if let Some(to) = redirected_to {
                let (to_path, to_query, to_fragment) = split_location(&to);
                path = to_path.to_string();
                query = to_query.map(str::to_string);
                fragment = to_fragment.map(str::to_string);
                continue;
            }

            let resolution = Resolution {
                requested: location.to_string(),
                final_path: join_location(&path, query.as_deref(), fragment.as_deref()),
                view: ResolvedView {
                    path: found.entry.path().to_string(),
                    name: found.entry.name.clone(),
                    component: component.clone(),
                },
                params: found.params.clone(),
                redirects,
            };
            debug!(
                "Resolved '{}' to '{}' ({} redirects)",
                resolution.requested,
                resolution.final_path,
                resolution.redirects.len()
            );
            return Ok(resolution);
        }
    }
}
