//! HTTP route definitions and handlers.
//!
//! Explicit routes cover health and gateway introspection. Everything else
//! goes through the fallback, which proxies, navigates or serves static
//! files, in that order.

mod app_routes;
mod gateway_routes;
mod health_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes::routes())
        .merge(gateway_routes::routes())
        .fallback(app_routes::dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
