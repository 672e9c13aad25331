use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the gateway listens.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// `0.0.0.0` listens on all interfaces, `127.0.0.1` on loopback only.
    pub host: String,
    pub port: u16,
    /// Print the local and network URLs once the listener is up.
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5173,
            open: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How the navigation guard learns about the caller.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the cookie carrying the stored token.
    pub token_key: String,
    /// Where unauthenticated navigations to protected routes end up.
    pub login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            token_key: "token".to_string(),
            login_path: "/login".to_string(),
        }
    }
}
