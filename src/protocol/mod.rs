//! Wire protocol: identifiers, messages, and validation (§3, §4.3, §4.5, §6).

pub mod join_code;
pub mod messages;
pub mod types;
pub mod validation;

pub use join_code::generate_join_code;
pub use messages::{
    AdminActionKind, ClientMessage, FinalScoreEntry, FullState, ParticipantPoints,
    ParticipantSnapshot, RoundSnapshot, ServerMessage,
};
pub use types::{LobbyId, ParticipantId, Phase};
pub use validation::{validate_join_code, validate_name};
