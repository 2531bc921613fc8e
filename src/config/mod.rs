//! Configuration module for the Spektrum server.
//!
//! This module provides configuration management with support for:
//! - JSON configuration files
//! - Environment variable overrides
//! - Stdin input
//! - Sensible defaults
//!
//! # Module Structure
//!
//! - [`types`]: Root `Config` struct
//! - [`server`]: Lobby/round timing and registry configuration
//! - [`catalog`]: Catalog storage driver configuration
//! - [`security`]: Admin authentication and CORS configuration
//! - [`logging`]: Logging configuration
//! - [`websocket`]: ConnectionHub tunables
//! - [`loader`]: Configuration loading functions
//! - [`validation`]: Configuration validation functions
//! - [`defaults`]: Default value functions

// Submodules
pub mod catalog;
pub mod defaults;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;
pub mod websocket;

// Re-exports for convenience
pub use catalog::CatalogConfig;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use security::SecurityConfig;

pub use server::ServerConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate_config_security};

pub use websocket::WebSocketConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 7878);
        assert_eq!(config.server.round_duration_ms, 30_000);
        assert_eq!(config.server.ping_interval_secs, 20);
        assert_eq!(config.server.ping_timeout_secs, 40);
        assert_eq!(config.server.join_code_length, 6);
        assert_eq!(config.server.join_code_max_length, 16);

        assert_eq!(config.security.admin_passwords.len(), 0);
        assert_eq!(config.security.token_ttl_hours, 24);

        assert_eq!(config.websocket.outbound_queue_capacity, 32);
        assert_eq!(config.websocket.max_inbound_messages_per_sec, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.port, deserialized.port);
        assert_eq!(
            config.server.round_duration_ms,
            deserialized.server.round_duration_ms
        );
        assert_eq!(
            config.security.token_ttl_hours,
            deserialized.security.token_ttl_hours
        );
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_log_level_as_str() {
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn catalog_config_defaults_to_filesystem() {
        match CatalogConfig::default() {
            CatalogConfig::Filesystem { path } => assert_eq!(path, "catalog.json"),
            CatalogConfig::S3 { .. } => panic!("expected filesystem driver by default"),
        }
    }
}
