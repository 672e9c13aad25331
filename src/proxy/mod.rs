//! Development proxy rules.
//!
//! Each rule forwards every request whose path starts with its prefix to a
//! backend origin. Rules are checked in declaration order and the first
//! matching prefix wins. A rule that strips its prefix only matches at a
//! path segment boundary, so `/api` strips `/api/x` but leaves `/apiary`
//! to later rules.

pub mod forwarder;

use std::collections::HashSet;

use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use self::forwarder::Forwarder;

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ProxyRuleConfig {
    /// Path prefix, e.g. `/api`.
    pub prefix: String,
    /// Backend origin, e.g. `http://localhost:5000`.
    pub target: String,
    /// Send the backend's own host in the `Host` header instead of the caller's.
    #[serde(default)]
    pub change_origin: bool,
    /// Remove the prefix from the path before forwarding.
    #[serde(default)]
    pub strip_prefix: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProxyError {
    #[error("proxy prefix '{0}' must start with '/'")]
    InvalidPrefix(String),
    #[error("proxy prefix '{0}' is declared more than once")]
    DuplicatePrefix(String),
    #[error("proxy target '{target}' for prefix '{prefix}' is not an http(s) origin")]
    InvalidTarget { prefix: String, target: String },
}

#[derive(Debug, Clone)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: Url,
    pub change_origin: bool,
    pub strip_prefix: bool,
}

impl ProxyRule {
    /// Whether this rule forwards `path`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if self.strip_prefix => {
                rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/')
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Builds the upstream URL for a request path and optional raw query.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> String {
        let forwarded_path = match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if self.strip_prefix && rest.starts_with('/') => rest.to_string(),
            Some(rest) if self.strip_prefix => format!("/{}", rest),
            _ => path.to_string(),
        };

        let origin = self.target.as_str().trim_end_matches('/');
        match query {
            Some(query) if !query.is_empty() => format!("{}{}?{}", origin, forwarded_path, query),
            _ => format!("{}{}", origin, forwarded_path),
        }
    }

    /// Host (with port when not the scheme default) of the backend origin.
    pub fn target_authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        match self.target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

/// Ordered proxy rules, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    rules: Vec<ProxyRule>,
}

impl ProxyTable {
    pub fn build(configs: &[ProxyRuleConfig]) -> Result<Self, ProxyError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(configs.len());

        for config in configs {
            if !config.prefix.starts_with('/') {
                return Err(ProxyError::InvalidPrefix(config.prefix.clone()));
            }
            if !seen.insert(config.prefix.clone()) {
                return Err(ProxyError::DuplicatePrefix(config.prefix.clone()));
            }

            let invalid = || ProxyError::InvalidTarget {
                prefix: config.prefix.clone(),
                target: config.target.clone(),
            };
            let target = Url::parse(&config.target).map_err(|_| invalid())?;
            if !matches!(target.scheme(), "http" | "https") || target.host_str().is_none() {
                return Err(invalid());
            }

            info!("Proxying '{}' to {}", config.prefix, target);
            rules.push(ProxyRule {
                prefix: config.prefix.clone(),
                target,
                change_origin: config.change_origin,
                strip_prefix: config.strip_prefix,
            });
        }

        Ok(ProxyTable { rules })
    }

    /// First rule that forwards `path`.
    pub fn find(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn rules(&self) -> &[ProxyRule] {
        &self.rules
    }
}
