//! LobbyRegistry (C4): creates lobby actors, maps join codes to handles, and
//! reaps idle or long-finished lobbies (§4.4).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;

use crate::catalog::types::QuestionSetId;
use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::error::ErrorCode;
use crate::lobby::{Lobby, LobbyHandle, LobbySpec};
use crate::metrics::Metrics;
use crate::protocol::{generate_join_code, LobbyId, ParticipantId, Phase};
use crate::tokens::TokenMint;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no live lobby matches the given join code")]
    NotFound,
    #[error("the issuer is not authorized to close this lobby")]
    Unauthorized,
}

impl RegistryError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::LobbyNotFound,
            Self::Unauthorized => ErrorCode::Unauthorized,
        }
    }
}

/// Tracks every live lobby by both its internal id and its public join code
/// (§3, §4.4). Lookups never touch a lobby actor's mailbox.
pub struct LobbyRegistry {
    by_id: DashMap<LobbyId, LobbyHandle>,
    by_join_code: DashMap<String, LobbyId>,
    catalog: Arc<Catalog>,
    metrics: Arc<Metrics>,
    config: ServerConfig,
}

impl LobbyRegistry {
    pub fn new(catalog: Arc<Catalog>, metrics: Arc<Metrics>, config: ServerConfig) -> Self {
        Self {
            by_id: DashMap::new(),
            by_join_code: DashMap::new(),
            catalog,
            metrics,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Create a new lobby and spawn its actor. Returns the handle and the
    /// freshly minted host's participant id so the caller can issue a host
    /// token for it.
    pub fn create_lobby(
        &self,
        host_name: String,
        set_id: Option<QuestionSetId>,
        round_duration_ms: Option<u64>,
    ) -> (LobbyHandle, ParticipantId) {
        let join_code = self.allocate_join_code();
        let host_id = ParticipantId::new_v4();
        let lobby_id = LobbyId::new_v4();

        let handle = Lobby::spawn(LobbySpec {
            id: lobby_id,
            join_code: join_code.clone(),
            host_id,
            host_name,
            set_id,
            round_duration_ms: round_duration_ms.unwrap_or(self.config.round_duration_ms),
            catalog: Arc::clone(&self.catalog),
            metrics: Arc::clone(&self.metrics),
        });

        self.by_id.insert(lobby_id, handle.clone());
        self.by_join_code.insert(join_code, lobby_id);
        self.metrics
            .lobbies_created
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        (handle, host_id)
    }

    /// Draw a join code, retrying on collision and widening the digit count
    /// once the configured attempt budget for a width is exhausted (§4.4).
    fn allocate_join_code(&self) -> String {
        let mut length = self.config.join_code_length;
        loop {
            for _ in 0..self.config.join_code_max_attempts {
                let code = generate_join_code(length);
                if !self.by_join_code.contains_key(&code) {
                    return code;
                }
                self.metrics
                    .join_code_collisions
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
            if length >= self.config.join_code_max_length {
                // Exhausted the widening budget; at the maximum width the
                // collision odds are negligible enough to accept the result
                // without another bounded retry loop.
                return generate_join_code(self.config.join_code_max_length);
            }
            length += 1;
        }
    }

    pub fn resolve_by_join_code(&self, join_code: &str) -> Result<LobbyHandle, RegistryError> {
        let lobby_id = *self
            .by_join_code
            .get(join_code)
            .ok_or(RegistryError::NotFound)?;
        self.resolve_by_id(lobby_id)
    }

    pub fn resolve_by_id(&self, lobby_id: LobbyId) -> Result<LobbyHandle, RegistryError> {
        self.by_id
            .get(&lobby_id)
            .map(|entry| entry.value().clone())
            .ok_or(RegistryError::NotFound)
    }

    fn remove(&self, lobby_id: LobbyId) {
        if let Some((_, handle)) = self.by_id.remove(&lobby_id) {
            self.by_join_code.remove(&handle.join_code);
        }
    }

    /// Close a lobby by id: tell the actor to tear down, then drop it from
    /// both maps and revoke every token bound to it. The actor itself
    /// enforces that only the host may close it (§4.3); a non-host `issuer`
    /// leaves the lobby untouched and its tokens unrevoked.
    pub async fn close_lobby(
        &self,
        lobby_id: LobbyId,
        issuer: ParticipantId,
        tokens: &TokenMint,
    ) -> Result<(), RegistryError> {
        let handle = self.resolve_by_id(lobby_id)?;
        handle
            .close(issuer)
            .await
            .map_err(|_| RegistryError::Unauthorized)?;
        self.remove(lobby_id);
        tokens.revoke_lobby(lobby_id).await;
        Ok(())
    }

    /// Reap lobbies that have been idle past their configured timeout, and
    /// any that reached `GameOver` and outlived their retention window.
    /// Also drops entries whose actor has already exited on its own (a
    /// `CloseLobby` issued directly against the handle without going through
    /// the registry).
    pub async fn gc_sweep(&self) -> usize {
        let ids: Vec<LobbyId> = self.by_id.iter().map(|entry| *entry.key()).collect();
        let mut reaped = 0;
        for id in ids {
            let Some(handle) = self.by_id.get(&id).map(|entry| entry.value().clone()) else {
                continue;
            };
            match handle.status().await {
                Some(status) => {
                    let limit = if status.phase == Phase::GameOver {
                        Duration::from_secs(self.config.gameover_retention_secs)
                    } else {
                        Duration::from_secs(self.config.lobby_idle_timeout_secs)
                    };
                    if status.idle_for >= limit {
                        self.remove(id);
                        reaped += 1;
                    }
                }
                None => {
                    self.remove(id);
                    reaped += 1;
                }
            }
        }
        reaped
    }
}
