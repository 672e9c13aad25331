use std::net::SocketAddr;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ProxyRule;
use crate::utils::http_helpers::HTTPError;
use crate::utils::log_throttle::LogThrottle;

/// Largest request body buffered before forwarding.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

const UPSTREAM_FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_REQUEST_ID: &str = "x-request-id";

/// Drops hop-by-hop headers, including any named by the `Connection` header.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Relays requests to proxy targets over a shared HTTP client.
pub struct Forwarder {
    client: reqwest::Client,
    /// Deadline for the upstream response head. The body is not bounded.
    timeout: Duration,
    throttle: LogThrottle,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Forwarder {
            client,
            timeout,
            throttle: LogThrottle::new(UPSTREAM_FAILURE_LOG_WINDOW),
        })
    }

    /// Forwards `request` to the target of `rule` and relays the answer.
    ///
    /// Connection failures map to `502 Bad Gateway`. An upstream that does
    /// not send its status line and headers within the timeout maps to
    /// `504 Gateway Timeout`. Once headers arrive the body is streamed
    /// for as long as the upstream keeps sending it.
    pub async fn forward(
        &self,
        rule: &ProxyRule,
        request: Request<Body>,
    ) -> Result<Response, HTTPError> {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let (parts, body) = request.into_parts();
        let url = rule.upstream_url(parts.uri.path(), parts.uri.query());

        let body = to_bytes(body, MAX_REQUEST_BODY_BYTES).await.map_err(|e| {
            HTTPError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Could not read request body: {}", e),
            )
        })?;

        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);

        let original_host = parts.headers.get(header::HOST).cloned();
        if rule.change_origin {
            if let Ok(host) = HeaderValue::from_str(&rule.target_authority()) {
                headers.insert(header::HOST, host);
            }
        }
        if let Some(host) = original_host {
            headers.insert(X_FORWARDED_HOST, host);
        }
        if let Some(ip) = client_ip {
            let forwarded_for = match parts
                .headers
                .get(X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
            {
                Some(existing) => format!("{}, {}", existing, ip),
                None => ip,
            };
            if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
                headers.insert(X_FORWARDED_FOR, value);
            }
        }
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(X_REQUEST_ID, value);
        }

        debug!(
            request_id = %request_id,
            "Forwarding {} {} to {}",
            parts.method,
            parts.uri,
            url
        );

        let pending = self
            .client
            .request(parts.method.clone(), &url)
            .headers(headers)
            .body(body)
            .send();
        let upstream = tokio::time::timeout(self.timeout, pending)
            .await
            .map_err(|_| {
                self.upstream_failure(rule, &url, true, "no response before the deadline")
            })?
            .map_err(|e| self.upstream_failure(rule, &url, e.is_timeout(), &e.to_string()))?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);

        debug!(request_id = %request_id, "Upstream answered {} for {}", status, url);

        let mut response = Response::builder()
            .status(status)
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        *response.headers_mut() = response_headers;
        Ok(response)
    }

    fn upstream_failure(
        &self,
        rule: &ProxyRule,
        url: &str,
        timed_out: bool,
        detail: &str,
    ) -> HTTPError {
        let (status, message) = if timed_out {
            (StatusCode::GATEWAY_TIMEOUT, "Upstream timed out")
        } else {
            (StatusCode::BAD_GATEWAY, "Upstream unreachable")
        };

        if let Some(suppressed) = self.throttle.should_emit(&rule.prefix) {
            warn!(
                prefix = %rule.prefix,
                suppressed,
                "{} for {}: {}",
                message,
                url,
                detail
            );
        }

        HTTPError::new(status, format!("{} ({})", message, rule.target))
    }
}
