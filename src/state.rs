//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, the navigator, the proxy rules and the forwarder.

use crate::alias::AliasMap;
use crate::config::ConfigV1;
use crate::navigation::Navigator;
use crate::proxy::{Forwarder, ProxyTable};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Everything in here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Route table plus navigation guards.
    pub navigator: Arc<Navigator>,
    /// Path alias table used for component references.
    pub aliases: Arc<AliasMap>,
    /// Prefix rules for requests relayed to the backend.
    pub proxy: Arc<ProxyTable>,
    /// HTTP client relaying proxied requests.
    pub forwarder: Arc<Forwarder>,
}
