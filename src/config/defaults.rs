//! Default value functions for configuration fields.
//!
//! This module contains all the default value functions used by serde's `#[serde(default = ...)]`
//! attributes throughout the configuration system. Functions are organized by category for
//! easier maintenance.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    7878
}

// =============================================================================
// Lobby / round timing defaults
// =============================================================================

pub const fn default_round_duration_ms() -> u64 {
    30_000
}

pub const fn default_ping_interval_secs() -> u64 {
    20
}

pub const fn default_ping_timeout_secs() -> u64 {
    40
}

pub const fn default_lobby_idle_timeout_secs() -> u64 {
    2 * 60 * 60
}

pub const fn default_gameover_retention_secs() -> u64 {
    10 * 60
}

pub const fn default_gc_sweep_interval_secs() -> u64 {
    60
}

// =============================================================================
// Join code defaults
// =============================================================================

pub const fn default_join_code_length() -> usize {
    6
}

pub const fn default_join_code_max_length() -> usize {
    16
}

pub const fn default_join_code_max_attempts() -> u32 {
    16
}

// =============================================================================
// Token defaults
// =============================================================================

pub const fn default_token_ttl_hours() -> u64 {
    24
}

// =============================================================================
// Connection hub defaults
// =============================================================================

pub const fn default_outbound_queue_capacity() -> usize {
    32
}

pub const fn default_max_inbound_message_bytes() -> usize {
    16 * 1024
}

pub const fn default_max_inbound_messages_per_sec() -> u32 {
    10
}

// =============================================================================
// Catalog defaults
// =============================================================================

pub fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

// =============================================================================
// CORS / security defaults
// =============================================================================

pub fn default_cors_origins() -> Vec<String> {
    Vec::new()
}

// =============================================================================
// Logging defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "spektrum.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}
