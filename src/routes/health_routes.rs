//! Health check endpoints.

use crate::state::AppState;
use axum::{
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Returns a 200 OK once the route table and proxy rules are loaded, which
/// is always the case for a running gateway.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
