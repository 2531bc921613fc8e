//! Lobby/round timing and registry configuration.

use super::defaults::{
    default_gameover_retention_secs, default_gc_sweep_interval_secs, default_join_code_length,
    default_join_code_max_attempts, default_join_code_max_length, default_lobby_idle_timeout_secs,
    default_ping_interval_secs, default_ping_timeout_secs, default_round_duration_ms,
};
use serde::{Deserialize, Serialize};

/// Server configuration for lobby lifecycle and round timing (§4.3-4.5, §5).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Default round duration in milliseconds, used unless a lobby overrides it at creation.
    #[serde(default = "default_round_duration_ms")]
    pub round_duration_ms: u64,
    /// Interval between server `Ping` frames on each attached connection.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    /// Connection inactivity window (no `Pong`, no message) before force-close.
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: u64,
    /// Lobby idle timeout: a lobby with no activity for this long is garbage-collected.
    #[serde(default = "default_lobby_idle_timeout_secs")]
    pub lobby_idle_timeout_secs: u64,
    /// Retention window for a lobby that has reached `GameOver`.
    #[serde(default = "default_gameover_retention_secs")]
    pub gameover_retention_secs: u64,
    /// Interval between `LobbyRegistry::gc_sweep` passes.
    #[serde(default = "default_gc_sweep_interval_secs")]
    pub gc_sweep_interval_secs: u64,
    /// Initial digit count for generated join codes.
    #[serde(default = "default_join_code_length")]
    pub join_code_length: usize,
    /// Upper bound on join code digit-widening (§4.4).
    #[serde(default = "default_join_code_max_length")]
    pub join_code_max_length: usize,
    /// Collision-retry attempts per digit width before widening.
    #[serde(default = "default_join_code_max_attempts")]
    pub join_code_max_attempts: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            round_duration_ms: default_round_duration_ms(),
            ping_interval_secs: default_ping_interval_secs(),
            ping_timeout_secs: default_ping_timeout_secs(),
            lobby_idle_timeout_secs: default_lobby_idle_timeout_secs(),
            gameover_retention_secs: default_gameover_retention_secs(),
            gc_sweep_interval_secs: default_gc_sweep_interval_secs(),
            join_code_length: default_join_code_length(),
            join_code_max_length: default_join_code_max_length(),
            join_code_max_attempts: default_join_code_max_attempts(),
        }
    }
}
