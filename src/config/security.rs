//! Admin authentication and CORS configuration.

use super::defaults::{default_cors_origins, default_token_ttl_hours};
use serde::{Deserialize, Serialize};

/// Security configuration: the admin password(s) gating lobby creation and
/// catalog management, and CORS allowances for the HTTP surface.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty means no cross-origin requests are permitted.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Shared-secret admin passwords accepted by the AdminAPI, compared in
    /// constant time. Configuring more than one supports rotation without
    /// downtime.
    #[serde(default)]
    pub admin_passwords: Vec<String>,
    /// Session token time-to-live, in hours, measured from last use.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            admin_passwords: Vec::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}
