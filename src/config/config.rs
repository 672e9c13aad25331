use std::collections::HashMap;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::server::{AuthConfig, ServerConfig};
use crate::navigation::{RouteConfig, RouteMeta};
use crate::proxy::ProxyRuleConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "LEDGERGATE_CONFIG";
/// Prefix of environment overrides, e.g. `LEDGERGATE_SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "LEDGERGATE_";
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: listener, static files, alias, auth, proxy rules and routes.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ConfigV1 {
    pub server: ServerConfig,
    /// Directory holding the built application (`index.html` and assets).
    pub static_root: String,
    pub alias: HashMap<String, String>,
    pub auth: AuthConfig,
    pub proxy: Vec<ProxyRuleConfig>,
    pub proxy_timeout_in_ms: u64,
    pub routes: Vec<RouteConfig>,
    pub logging: LoggingConfig,
}

impl Default for ConfigV1 {
    fn default() -> Self {
        ConfigV1 {
            server: ServerConfig::default(),
            static_root: "./dist".to_string(),
            alias: HashMap::from([("@".to_string(), "/src".to_string())]),
            auth: AuthConfig::default(),
            proxy: vec![ProxyRuleConfig {
                prefix: "/api".to_string(),
                target: "http://localhost:5000".to_string(),
                change_origin: false,
                strip_prefix: false,
            }],
            proxy_timeout_in_ms: 30_000,
            routes: default_routes(),
            logging: LoggingConfig::default(),
        }
    }
}

fn view(path: &str, name: &str, requires_auth: bool) -> RouteConfig {
    RouteConfig {
        path: path.to_string(),
        component: Some(format!("@/views/{}.vue", name)),
        name: Some(name.to_string()),
        redirect: None,
        meta: RouteMeta { requires_auth },
    }
}

/// The route table shipped with the application.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            path: "/".to_string(),
            component: None,
            name: None,
            redirect: Some("/login".to_string()),
            meta: RouteMeta::default(),
        },
        view("/login", "LoginView", false),
        view("/chat", "ChatView", true),
        view("/ledger", "LedgerView", true),
    ]
}

/// Layers defaults, the YAML file at `path` and `LEDGERGATE_*` variables.
pub fn figment(path: &str) -> Figment {
    Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
}

/// Extracts a versioned configuration from any figment.
pub fn load_config_from(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from `$LEDGERGATE_CONFIG`, or `./config.yaml`, exiting on error.
pub fn load_config() -> ConfigV1 {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match load_config_from(figment(&path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(schema) => println!("{}", schema),
        Err(e) => eprintln!("Error rendering configuration schema: {}", e),
    }
}
