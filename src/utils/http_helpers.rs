use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{self, HeaderMap};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::navigation::{AuthState, NavigationError};
use crate::state::AppState;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Converts our `HTTPError` into a JSON `{"error": ...}` response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message }).to_string();
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

impl From<NavigationError> for HTTPError {
    fn from(error: NavigationError) -> Self {
        let status = match error {
            NavigationError::NotFound(_) => StatusCode::NOT_FOUND,
            NavigationError::Blocked { .. } => StatusCode::FORBIDDEN,
            NavigationError::RedirectLoop(_) => StatusCode::LOOP_DETECTED,
        };
        HTTPError::new(status, error.to_string())
    }
}

/// Reads a cookie value by name from every `Cookie` header of a request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Extractor implementation: builds the caller's `AuthState` from the token
/// cookie. A missing cookie is not an error, only an anonymous caller.
#[async_trait]
impl FromRequestParts<AppState> for AuthState {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<AuthState, Infallible> {
        Ok(AuthState {
            token: read_cookie(&parts.headers, &state.config.auth.token_key),
        })
    }
}
