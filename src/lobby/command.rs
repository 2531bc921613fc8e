//! The internal command set a [`super::Lobby`] actor consumes from its
//! single serial queue (§4.3, §5). Every variant that can fail carries its
//! own reply channel; `Detach` and `Tick` are fire-and-forget, issued by the
//! connection hub and the lobby's own round timer respectively.

use tokio::sync::{mpsc, oneshot};

use crate::error::ErrorCode;
use crate::protocol::{ParticipantId, ServerMessage};

use super::StatusSnapshot;

/// Failure modes surfaced back through a command's reply channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("the lobby has been closed")]
    Closed,
    #[error("no participant matches the given id in this lobby")]
    ParticipantUnknown,
    #[error("this command cannot be applied in the lobby's current phase")]
    InvalidPhase,
    #[error("the upcoming question queue is empty")]
    NoMoreQuestions,
    #[error("an answer was already recorded for this round")]
    AlreadyAnswered,
    #[error("the submitted answer is not one of this round's alternatives")]
    UnknownAlternative,
    #[error("the catalog has no questions to draw from")]
    EmptyCatalog,
    #[error("that name is already in use in this lobby")]
    NameTaken,
    #[error("the lobby has already started and is not accepting joins")]
    NotJoinable,
    #[error("the issuer is not authorized to perform this action")]
    Unauthorized,
}

impl LobbyError {
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::Closed => ErrorCode::LobbyClosed,
            Self::ParticipantUnknown => ErrorCode::ParticipantUnknown,
            Self::InvalidPhase => ErrorCode::InvalidPhase,
            Self::NoMoreQuestions => ErrorCode::NoMoreQuestions,
            Self::AlreadyAnswered => ErrorCode::AlreadyAnswered,
            Self::UnknownAlternative => ErrorCode::UnknownAlternative,
            Self::EmptyCatalog => ErrorCode::EmptyCatalog,
            Self::NameTaken => ErrorCode::NameTaken,
            Self::NotJoinable => ErrorCode::LobbyNotJoinable,
            Self::Unauthorized => ErrorCode::Unauthorized,
        }
    }
}

pub type Reply<T> = oneshot::Sender<Result<T, LobbyError>>;

/// The lobby actor's mailbox type. One queue, one writer task, total
/// command ordering (§5) — this is what lets same-millisecond answers and
/// the round timer race deterministically instead of under a lock.
#[derive(Debug)]
pub enum Command {
    Join {
        name: String,
        reply: Reply<ParticipantId>,
    },
    Attach {
        participant_id: ParticipantId,
        outbox: mpsc::Sender<std::sync::Arc<ServerMessage>>,
        reply: Reply<()>,
    },
    Detach {
        participant_id: ParticipantId,
    },
    SubmitAnswer {
        participant_id: ParticipantId,
        text: String,
        reply: Reply<()>,
    },
    StartGame {
        issuer: ParticipantId,
        reply: Reply<()>,
    },
    StartRound {
        issuer: ParticipantId,
        reply: Reply<()>,
    },
    EndRound {
        issuer: ParticipantId,
        reply: Reply<()>,
    },
    SkipQuestion {
        issuer: ParticipantId,
        reply: Reply<()>,
    },
    EndGame {
        issuer: ParticipantId,
        reply: Reply<()>,
    },
    CloseLobby {
        issuer: ParticipantId,
        reply: Reply<()>,
    },
    RemoveParticipant {
        issuer: ParticipantId,
        target: ParticipantId,
        reply: Reply<()>,
    },
    /// Self-issued: the round timer spawned by `StartRound` firing. Carries
    /// the wall-clock start time of the round it belongs to so a timer left
    /// over from a round already ended by an explicit `EndRound` is a no-op.
    Tick {
        round_started_at: chrono::DateTime<chrono::Utc>,
    },
    QueryStatus {
        reply: oneshot::Sender<StatusSnapshot>,
    },
}

impl Command {
    /// Resolve any pending reply with [`LobbyError::Closed`]. Used to drain
    /// the mailbox once `CloseLobby` has been applied (§4.3).
    pub fn reject_closed(self) {
        match self {
            Command::Join { reply, .. } => {
                let _ = reply.send(Err(LobbyError::Closed));
            }
            Command::Attach { reply, .. } => {
                let _ = reply.send(Err(LobbyError::Closed));
            }
            Command::SubmitAnswer { reply, .. } => {
                let _ = reply.send(Err(LobbyError::Closed));
            }
            Command::StartGame { reply, .. }
            | Command::StartRound { reply, .. }
            | Command::EndRound { reply, .. }
            | Command::SkipQuestion { reply, .. }
            | Command::EndGame { reply, .. }
            | Command::CloseLobby { reply, .. }
            | Command::RemoveParticipant { reply, .. } => {
                let _ = reply.send(Err(LobbyError::Closed));
            }
            Command::Detach { .. } | Command::Tick { .. } | Command::QueryStatus { .. } => {}
        }
    }
}
