//! Root configuration type.

use super::catalog::CatalogConfig;
use super::defaults::default_port;
use super::logging::LoggingConfig;
use super::security::SecurityConfig;
use super::server::ServerConfig;
use super::websocket::WebSocketConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for the Spektrum server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
            websocket: WebSocketConfig::default(),
        }
    }
}
