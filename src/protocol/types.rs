//! Wire-level identifiers and the lobby phase enum (§3, §4.3).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a live lobby.
pub type LobbyId = Uuid;
/// Unique identifier for a participant (host or player) within a lobby.
pub type ParticipantId = Uuid;

/// A lobby's state machine position (§3, §4.3).
///
/// `Lobby → Score ↔ Question → GameOver`; `CloseLobby` tears the lobby down
/// from any state and is modeled outside this enum (the lobby simply stops
/// existing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Question,
    Score,
    GameOver,
}

impl Phase {
    /// Whether a non-host participant may still join in this phase (§4.6).
    pub const fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }
}
