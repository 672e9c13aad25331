//! Application startup and server initialization.
//!
//! Builds the alias table, route table, navigator and proxy rules from the
//! configuration, then binds the listener and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use inline_colorization::*;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::alias::AliasMap;
use crate::config::{ConfigV1, ServerConfig};
use crate::navigation::{Navigator, RouteTable, RouteTableError};
use crate::proxy::{Forwarder, ProxyError, ProxyTable};
use crate::routes;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteTableError),
    #[error("invalid proxy rules: {0}")]
    Proxy(#[from] ProxyError),
    #[error("could not build proxy client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("could not bind to {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Builds the shared state, validating routes and proxy rules.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, StartupError> {
    let aliases = AliasMap::new(&config.alias);
    let table = RouteTable::build(&config.routes, &aliases, &config.auth.login_path)?;
    let navigator = Navigator::with_auth_guard(table, &config.auth.login_path);
    let proxy = ProxyTable::build(&config.proxy)?;
    let forwarder = Forwarder::new(Duration::from_millis(config.proxy_timeout_in_ms))?;

    Ok(AppState {
        config,
        navigator: Arc::new(navigator),
        aliases: Arc::new(aliases),
        proxy: Arc::new(proxy),
        forwarder: Arc::new(forwarder),
    })
}

fn print_banner(server: &ServerConfig) {
    println!();
    println!("  {style_bold}{color_green}ledgergate{color_reset}{style_reset} v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(
        "  {color_green}➜{color_reset}  {style_bold}Local{style_reset}:   {color_cyan}http://localhost:{}/{color_reset}",
        server.port
    );
    if server.host == "0.0.0.0" || server.host == "::" {
        println!(
            "  {color_green}➜{color_reset}  {style_bold}Network{style_reset}: {color_cyan}http://<any interface>:{}/{color_reset}",
            server.port
        );
    } else {
        println!(
            "  {color_green}➜{color_reset}  {style_bold}Network{style_reset}: use {color_cyan}host: 0.0.0.0{color_reset} to expose"
        );
    }
    println!();
}

/// Initializes and runs the gateway.
///
/// # Errors
///
/// Returns an error if the configuration does not validate, the listener
/// cannot bind, or the server stops with an I/O error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), StartupError> {
    let state = build_state(config.clone())?;
    let app = routes::create_router(state);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    info!("Starting server on {}", address);
    if config.server.open {
        print_banner(&config.server);
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(StartupError::Serve)
}
