#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use ledgergate::config::{load_config_from, Config, ConfigV1};
use ledgergate::routes::create_router;
use ledgergate::startup::build_state;

pub const INDEX_HTML: &str = "<!doctype html><div id=\"app\"></div>";
pub const APP_JS: &str = "console.log('ledger');";

/// Parses a YAML document layered over the built-in defaults.
pub fn config_from_yaml(yaml: &str) -> ConfigV1 {
    load_config_from(
        Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
            .merge(Yaml::string(yaml)),
    )
    .expect("Failed to parse test config YAML")
}

/// Writes a small built application into a fresh temporary directory.
pub fn static_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("ledgergate-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(root.join("assets")).expect("failed to create static root");
    std::fs::write(root.join("index.html"), INDEX_HTML).expect("failed to write index.html");
    std::fs::write(root.join("assets").join("app.js"), APP_JS).expect("failed to write app.js");
    root
}

pub fn build_app(mut config: ConfigV1) -> Router {
    if config.static_root == ConfigV1::default().static_root {
        config.static_root = static_root().to_string_lossy().into_owned();
    }
    let state = build_state(Arc::new(config)).expect("state should build");
    create_router(state)
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("theme=dark; token={}", token));
    }
    let mut request = builder.body(body).expect("failed to build request");

    request.extensions_mut().insert(ConnectInfo(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        0,
    )));

    request
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, path, token, Body::empty())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header missing")
        .to_str()
        .expect("Location header not valid UTF-8")
}
