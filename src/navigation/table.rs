use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use super::route::{PathPattern, RouteConfig, RouteEntry, RouteMatch, RouteTarget};
use super::split_location;
use crate::alias::AliasMap;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route path '{0}' must start with '/'")]
    InvalidPath(String),
    #[error("route path '{0}' is declared more than once")]
    DuplicatePath(String),
    #[error("expected exactly one root route '/', found {0}")]
    RootCount(usize),
    #[error("route '{0}' must declare exactly one of 'component' or 'redirect'")]
    AmbiguousTarget(String),
    #[error("route '{path}' redirects to '{to}', which matches no route")]
    DanglingRedirect { path: String, to: String },
    #[error("login path '{0}' matches no route")]
    MissingLogin(String),
    #[error("login route '{0}' must not require authentication")]
    ProtectedLogin(String),
}

/// The ordered route table, built once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Validates the configured routes and compiles them.
    ///
    /// Component references are resolved through `aliases`. `login_path` is
    /// where the auth guard sends unauthenticated navigations, so it has to
    /// exist and be reachable without a token.
    pub fn build(
        configs: &[RouteConfig],
        aliases: &AliasMap,
        login_path: &str,
    ) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(configs.len());

        for config in configs {
            if !config.path.starts_with('/') {
                return Err(RouteTableError::InvalidPath(config.path.clone()));
            }
            let pattern = PathPattern::parse(&config.path);
            if !seen.insert(config.path.trim_end_matches('/').to_lowercase()) {
                return Err(RouteTableError::DuplicatePath(config.path.clone()));
            }

            let target = match (&config.component, &config.redirect) {
                (Some(component), None) => RouteTarget::View {
                    component: aliases.resolve(component),
                },
                (None, Some(to)) => RouteTarget::Redirect { to: to.clone() },
                _ => return Err(RouteTableError::AmbiguousTarget(config.path.clone())),
            };

            debug!("Compiled route '{}' -> {:?}", config.path, target);
            entries.push(RouteEntry {
                pattern,
                name: config.name.clone(),
                target,
                meta: config.meta,
            });
        }

        let roots = entries.iter().filter(|e| e.pattern.is_root()).count();
        if roots != 1 {
            return Err(RouteTableError::RootCount(roots));
        }

        let table = RouteTable { entries };

        for entry in &table.entries {
            if let RouteTarget::Redirect { to } = &entry.target {
                let (path, _, _) = split_location(to);
                if table.find(path).is_none() {
                    return Err(RouteTableError::DanglingRedirect {
                        path: entry.path().to_string(),
                        to: to.clone(),
                    });
                }
            }
        }

        match table.find(login_path) {
            None => return Err(RouteTableError::MissingLogin(login_path.to_string())),
            Some(found) if found.meta().requires_auth => {
                return Err(RouteTableError::ProtectedLogin(login_path.to_string()))
            }
            Some(_) => {}
        }

        info!("Route table ready with {} routes", table.entries.len());
        Ok(table)
    }

    /// Returns the first entry, in declaration order, matching `path`.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.entries.iter().find_map(|entry| {
            entry
                .pattern
                .matches(path)
                .map(|params| RouteMatch { entry, params })
        })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }
}
