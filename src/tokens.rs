//! TokenMint (C2): opaque admission/session tokens (§4.2).
//!
//! Maps an opaque, crypto-random token to a `(lobby, participant, role)`
//! binding. Tokens expire after a period of inactivity; every successful
//! [`TokenMint::resolve`] slides the expiry forward, so an actively-reconnecting
//! client never loses its token mid-session.

use crate::error::ErrorCode;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The role a session token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Host,
    Player,
}

/// What a token currently grants.
#[derive(Debug, Clone)]
pub struct Binding {
    pub lobby_id: Uuid,
    pub participant_id: Uuid,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not recognized or has been revoked")]
    Unknown,
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unknown => ErrorCode::TokenUnknown,
            Self::Expired => ErrorCode::TokenExpired,
        }
    }
}

/// Issues and resolves opaque session tokens.
#[derive(Debug)]
pub struct TokenMint {
    bindings: RwLock<HashMap<String, Binding>>,
    ttl: Duration,
}

impl TokenMint {
    pub fn new(ttl_hours: u64) -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            ttl: Duration::hours(ttl_hours.min(i64::MAX as u64) as i64),
        }
    }

    /// Issue a new token bound to `(lobby_id, participant_id, role)`.
    pub async fn issue(&self, lobby_id: Uuid, participant_id: Uuid, role: Role) -> String {
        let token = generate_token();
        let now = Utc::now();
        let binding = Binding {
            lobby_id,
            participant_id,
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        self.bindings.write().await.insert(token.clone(), binding);
        token
    }

    /// Resolve a token to its binding. A successful resolution slides the
    /// expiry forward by the configured TTL.
    pub async fn resolve(&self, token: &str) -> Result<Binding, TokenError> {
        let mut bindings = self.bindings.write().await;
        let binding = bindings.get_mut(token).ok_or(TokenError::Unknown)?;

        if binding.expires_at < Utc::now() {
            bindings.remove(token);
            return Err(TokenError::Expired);
        }

        binding.expires_at = Utc::now() + self.ttl;
        Ok(binding.clone())
    }

    /// Revoke a token immediately (explicit leave, lobby close).
    pub async fn revoke(&self, token: &str) {
        self.bindings.write().await.remove(token);
    }

    /// Revoke every token bound to `lobby_id` (lobby close / deletion).
    pub async fn revoke_lobby(&self, lobby_id: Uuid) {
        self.bindings
            .write()
            .await
            .retain(|_, binding| binding.lobby_id != lobby_id);
    }

    /// Sweep expired tokens. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut bindings = self.bindings.write().await;
        let before = bindings.len();
        let now = Utc::now();
        bindings.retain(|_, binding| binding.expires_at >= now);
        before - bindings.len()
    }
}

fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issues_and_resolves_a_token() {
        let mint = TokenMint::new(24);
        let lobby_id = Uuid::new_v4();
        let participant_id = Uuid::new_v4();
        let token = mint.issue(lobby_id, participant_id, Role::Player).await;

        let binding = mint.resolve(&token).await.unwrap();
        assert_eq!(binding.lobby_id, lobby_id);
        assert_eq!(binding.participant_id, participant_id);
        assert_eq!(binding.role, Role::Player);
    }

    #[tokio::test]
    async fn unknown_token_fails() {
        let mint = TokenMint::new(24);
        let err = mint.resolve("not-a-real-token").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TokenUnknown);
    }

    #[tokio::test]
    async fn revoked_token_fails_subsequent_resolves() {
        let mint = TokenMint::new(24);
        let token = mint
            .issue(Uuid::new_v4(), Uuid::new_v4(), Role::Host)
            .await;
        mint.revoke(&token).await;

        let err = mint.resolve(&token).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TokenUnknown);
    }

    #[tokio::test]
    async fn revoke_lobby_removes_every_bound_token() {
        let mint = TokenMint::new(24);
        let lobby_id = Uuid::new_v4();
        let host_token = mint.issue(lobby_id, Uuid::new_v4(), Role::Host).await;
        let player_token = mint.issue(lobby_id, Uuid::new_v4(), Role::Player).await;

        mint.revoke_lobby(lobby_id).await;

        assert!(mint.resolve(&host_token).await.is_err());
        assert!(mint.resolve(&player_token).await.is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_swept() {
        let mint = TokenMint::new(0);
        let token = mint
            .issue(Uuid::new_v4(), Uuid::new_v4(), Role::Player)
            .await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let err = mint.resolve(&token).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TokenExpired);

        let removed = mint.sweep_expired().await;
        assert_eq!(removed, 0, "resolve already evicted the expired entry");
    }
}
