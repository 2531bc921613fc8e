//! Client/server wire messages (§4.3, §4.5, §6).

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

use super::types::{LobbyId, ParticipantId, Phase};

/// Messages a connection may send (§4.5, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// Submit an answer for the current round.
    Answer { text: String },
    /// Voluntarily leave the lobby.
    Leave,
    /// A host-only administrative action.
    AdminAction { kind: AdminActionKind },
    /// Application-level keepalive; answered with `Pong`.
    Heartbeat,
}

/// The host actions routed through `AdminAction` (§4.3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionKind {
    StartGame,
    StartRound,
    EndRound,
    SkipQuestion,
    EndGame,
    CloseGame,
}

/// A participant row as reported in a [`FullState`](ServerMessage::FullState)
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    pub participant_id: ParticipantId,
    pub name: String,
    pub score: u32,
    pub last_round_score: u32,
    pub is_host: bool,
    pub is_attached: bool,
    /// Whether this participant has already answered the in-progress round
    /// (correctness withheld until `RoundEnded`, per §4.3).
    pub has_answered: bool,
}

/// The in-progress round as reported in a `FullState` snapshot, present iff
/// `phase == Question` (§3 invariant 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub question_id: uuid::Uuid,
    pub alternatives: Vec<String>,
    pub duration_ms: u64,
    pub server_started_at: chrono::DateTime<chrono::Utc>,
}

/// Full authoritative snapshot, replayed to a connection immediately on
/// attach, before any deltas (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullState {
    pub lobby_id: LobbyId,
    pub join_code: String,
    pub phase: Phase,
    pub round_duration_ms: u64,
    pub participants: Vec<ParticipantSnapshot>,
    pub current_round: Option<RoundSnapshot>,
    pub questions_remaining: usize,
}

/// Per-participant point delta reported on `RoundEnded` (§4.3, §6, §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantPoints {
    pub participant_id: ParticipantId,
    pub delta: u32,
    pub total: u32,
}

/// Final scoreboard row reported on `GameEnded` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalScoreEntry {
    pub participant_id: ParticipantId,
    pub name: String,
    pub score: u32,
}

/// Typed state deltas fanned out to attached connections (§4.3, §6).
/// `FullState` is sent only once, immediately on attach; every other variant
/// is a delta published as the lobby mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    FullState(FullState),
    PhaseChanged {
        phase: Phase,
    },
    ParticipantJoined {
        participant_id: ParticipantId,
        name: String,
    },
    ParticipantLeft {
        participant_id: ParticipantId,
    },
    RoundStarted {
        question_id: uuid::Uuid,
        alternatives: Vec<String>,
        duration_ms: u64,
        server_started_at: chrono::DateTime<chrono::Utc>,
    },
    /// A participant answered; correctness is withheld until `RoundEnded`
    /// (§4.3) so live scoreboards can't leak it.
    AnswerReceived {
        participant_id: ParticipantId,
    },
    RoundEnded {
        correct_options: Vec<String>,
        per_participant: Vec<ParticipantPoints>,
    },
    GameEnded {
        #[serde(rename = "final")]
        final_scoreboard: Vec<FinalScoreEntry>,
    },
    LobbyClosed {
        reason: String,
    },
    /// Delivered only to the originating connection, never broadcast (§4.3, §7).
    Error {
        code: ErrorCode,
        message: String,
    },
    Pong,
}
