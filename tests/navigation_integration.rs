mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, StatusCode};
use ledgergate::alias::AliasMap;
use ledgergate::navigation::{
    AuthState, GuardDecision, NavigationGuard, Navigator, RequiresAuthGuard, RouteMatch,
    RouteTable,
};
use ledgergate::routes::create_router;
use ledgergate::startup::build_state;
use serde_json::Value;
use tower::ServiceExt;

use common::{
    body_string, build_app, config_from_yaml, get, location, request, static_root, APP_JS,
    INDEX_HTML,
};

const FINAL_REVISION: &str = r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
"#;

const EARLIER_REVISION: &str = r#"
version: "1.0.0"
routes:
  - path: /
    redirect: /chat
  - path: /login
    name: LoginView
    component: "@/views/LoginView.vue"
  - path: /chat
    name: ChatView
    component: "@/views/ChatView.vue"
  - path: /ledger
    component: "@/views/LedgerView.vue"
"#;

#[tokio::test]
async fn protected_route_without_token_redirects_to_login() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    for path in ["/ledger", "/chat"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn protected_route_with_token_serves_the_view() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app.oneshot(get("/ledger", Some("abc"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-route-view").unwrap(),
        "LedgerView"
    );
    assert_eq!(body_string(response).await, INDEX_HTML);
}

#[tokio::test]
async fn empty_token_counts_as_missing() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app.oneshot(get("/chat", Some(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn root_redirects_to_login_regardless_of_token() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    for token in [None, Some("abc")] {
        let response = app.clone().oneshot(get("/", token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn login_is_always_reachable() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app.oneshot(get("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-route-view").unwrap(), "LoginView");
}

#[tokio::test]
async fn client_routes_only_answer_reads() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app
        .oneshot(request(Method::POST, "/ledger", Some("abc"), Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn earlier_revision_leaves_views_open() {
    let app = build_app(config_from_yaml(EARLIER_REVISION));

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/chat");

    let response = app.oneshot(get("/ledger", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-route-view").is_none());
}

#[tokio::test]
async fn resolve_endpoint_reports_the_final_path() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app
        .clone()
        .oneshot(get("/__gateway/resolve?path=/ledger", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["final_path"], "/login");
    assert_eq!(body["redirects"][0]["reason"]["type"], "guard");
    assert_eq!(body["view"]["component"], "/src/views/LoginView.vue");

    let response = app
        .oneshot(get("/__gateway/resolve?path=/ledger", Some("abc")))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["final_path"], "/ledger");
    assert_eq!(body["redirects"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn resolve_endpoint_rejects_unknown_paths() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app
        .oneshot(get("/__gateway/resolve?path=/budgets", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "no route matches '/budgets'");
}

#[tokio::test]
async fn redirect_cycles_are_loop_detected() {
    let app = build_app(config_from_yaml(
        r#"
version: "1.0.0"
routes:
  - path: /
    redirect: /a
  - path: /a
    redirect: /b
  - path: /b
    redirect: /a
  - path: /login
    component: "@/views/LoginView.vue"
"#,
    ));

    let response = app
        .clone()
        .oneshot(get("/__gateway/resolve?path=/a", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::LOOP_DETECTED);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "navigation to '/a' exceeded the redirect limit");

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::LOOP_DETECTED);
}

struct Maintenance;

impl NavigationGuard for Maintenance {
    fn name(&self) -> &str {
        "maintenance"
    }

    fn check(&self, to: &RouteMatch<'_>, _auth: &AuthState) -> GuardDecision {
        if to.entry.path() == "/ledger" {
            GuardDecision::Block("ledger is read-only today".to_string())
        } else {
            GuardDecision::Allow
        }
    }
}

#[tokio::test]
async fn blocking_guard_answers_forbidden() {
    let mut config = config_from_yaml(FINAL_REVISION);
    config.static_root = static_root().to_string_lossy().into_owned();
    let mut state = build_state(Arc::new(config.clone())).unwrap();
    let aliases = AliasMap::new(&config.alias);
    let table = RouteTable::build(&config.routes, &aliases, &config.auth.login_path).unwrap();
    state.navigator = Arc::new(Navigator::new(
        table,
        vec![
            Box::new(RequiresAuthGuard::new(config.auth.login_path.as_str())),
            Box::new(Maintenance),
        ],
    ));
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(get("/__gateway/resolve?path=/ledger", Some("abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("ledger is read-only today"));

    let response = app.clone().oneshot(get("/ledger", Some("abc"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The auth guard runs first, so anonymous callers are still sent to login.
    let response = app.oneshot(get("/ledger", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn routes_endpoint_lists_the_table() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app.oneshot(get("/__gateway/routes", None)).await.unwrap();
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    let routes = body.as_array().unwrap();
    assert_eq!(routes.len(), 4);
    assert_eq!(routes[0]["path"], "/");
    assert_eq!(routes[0]["target"]["type"], "redirect");
    assert_eq!(routes[0]["target"]["to"], "/login");
    assert_eq!(routes[3]["path"], "/ledger");
    assert_eq!(routes[3]["requires_auth"], true);
}

#[tokio::test]
async fn alias_endpoint_resolves_specifiers() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app
        .oneshot(get("/__gateway/alias?specifier=@/views/ChatView.vue", None))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["resolved"], "/src/views/ChatView.vue");
}

#[tokio::test]
async fn other_paths_fall_through_to_static_files() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app.clone().oneshot(get("/assets/app.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, APP_JS);

    let response = app.oneshot(get("/assets/missing.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_check_answers_ok() {
    let app = build_app(config_from_yaml(FINAL_REVISION));

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}
