//! Gateway introspection endpoints: route table, navigation resolution and
//! alias lookup.

use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::navigation::{AuthState, Resolution, RouteTarget};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers gateway introspection routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/__gateway/routes", get(list_routes))
        .route("/__gateway/resolve", get(resolve))
        .route("/__gateway/alias", get(resolve_alias))
}

#[derive(Serialize)]
struct RouteSummary {
    path: String,
    name: Option<String>,
    target: RouteTarget,
    requires_auth: bool,
}

/// Lists the route table in declaration order.
async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    let routes = state
        .navigator
        .table()
        .entries()
        .iter()
        .map(|entry| RouteSummary {
            path: entry.path().to_string(),
            name: entry.name.clone(),
            target: entry.target.clone(),
            requires_auth: entry.meta.requires_auth,
        })
        .collect();
    Json(routes)
}

#[derive(Deserialize)]
struct ResolveQuery {
    path: String,
}

/// Resolves a location for the calling client, as the browser would.
async fn resolve(
    State(state): State<AppState>,
    auth: AuthState,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<Resolution>, HTTPError> {
    let resolution = state.navigator.resolve(&query.path, &auth)?;
    Ok(Json(resolution))
}

#[derive(Deserialize)]
struct AliasQuery {
    specifier: String,
}

#[derive(Serialize)]
struct AliasResolution {
    specifier: String,
    resolved: String,
}

async fn resolve_alias(
    State(state): State<AppState>,
    Query(query): Query<AliasQuery>,
) -> Json<AliasResolution> {
    let resolved = state.aliases.resolve(&query.specifier);
    Json(AliasResolution {
        specifier: query.specifier,
        resolved,
    })
}
