//! Fallback dispatch: proxy, client navigation, then static files.

use std::path::Path;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::navigation::AuthState;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

const X_ROUTE_VIEW: &str = "x-route-view";

/// Handles every request not claimed by an explicit route.
pub async fn dispatch(
    State(state): State<AppState>,
    auth: AuthState,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    if let Some(rule) = state.proxy.find(&path) {
        return match state.forwarder.forward(rule, request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        };
    }

    if state.navigator.table().find(&path).is_some() {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return HTTPError::new(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("'{}' is a client route and only answers GET", path),
            )
            .into_response();
        }
        let location = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.clone());
        return match navigate(&state, &auth, &location).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        };
    }

    serve_static(&state, request).await
}

/// Resolves a client route and either redirects or serves the app shell.
async fn navigate(
    state: &AppState,
    auth: &AuthState,
    location: &str,
) -> Result<Response, HTTPError> {
    let resolution = state.navigator.resolve(location, auth)?;

    if resolution.redirected() {
        debug!(
            "Redirecting navigation '{}' to '{}'",
            resolution.requested, resolution.final_path
        );
        let location = HeaderValue::from_str(&resolution.final_path)
            .map_err(|e| HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
    }

    let index = Path::new(&state.config.static_root).join("index.html");
    let html = tokio::fs::read(&index).await.map_err(|e| {
        HTTPError::new(
            StatusCode::NOT_FOUND,
            format!("Could not read {}: {}", index.display(), e),
        )
    })?;

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        html,
    )
        .into_response();
    if let Some(name) = &resolution.view.name {
        if let Ok(value) = HeaderValue::from_str(name) {
            response.headers_mut().insert(X_ROUTE_VIEW, value);
        }
    }
    Ok(response)
}

async fn serve_static(state: &AppState, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    let response = match ServeDir::new(&state.config.static_root)
        .oneshot(request)
        .await
    {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return HTTPError::new(
            StatusCode::NOT_FOUND,
            format!("No route or file matches '{}'", path),
        )
        .into_response();
    }
    response.into_response()
}
