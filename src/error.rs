//! Stable error taxonomy shared by the HTTP surface and the websocket protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes surfaced to clients, either as an HTTP status + body or as the
/// `code` field of an `Error` websocket frame.
///
/// Stable across releases: clients are expected to match on these strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Auth/credential
    Unauthorized,
    TokenExpired,
    TokenUnknown,

    // Lookup
    LobbyNotFound,
    ParticipantUnknown,
    QuestionNotFound,

    // State
    InvalidPhase,
    NoMoreQuestions,
    LobbyNotJoinable,
    LobbyClosed,
    AlreadyAnswered,
    EmptyCatalog,

    // Validation
    InvalidName,
    NameTaken,
    InvalidJoinCode,
    UnknownAlternative,
    PayloadTooLarge,
    InvalidConfig,
    MalformedMessage,

    // Rate
    RateLimited,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Human-readable description, analogous to an actionable client-facing message.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unauthorized => "The admin password is missing or incorrect.",
            Self::TokenExpired => "The session token has expired. Join the lobby again.",
            Self::TokenUnknown => "The session token is not recognized or has been revoked.",
            Self::LobbyNotFound => "No live lobby matches the given join code.",
            Self::ParticipantUnknown => "No participant matches the given id in this lobby.",
            Self::QuestionNotFound => "The referenced question does not exist in the catalog.",
            Self::InvalidPhase => "This command cannot be applied in the lobby's current phase.",
            Self::NoMoreQuestions => "The upcoming question queue is empty.",
            Self::LobbyNotJoinable => "The lobby has already started and is not accepting joins.",
            Self::LobbyClosed => "The lobby has been closed.",
            Self::AlreadyAnswered => "An answer was already recorded for this round.",
            Self::EmptyCatalog => "The catalog has no questions to draw from.",
            Self::InvalidName => "Names must be 2-16 characters of letters, digits, space, `_-.`.",
            Self::NameTaken => "That name is already in use in this lobby.",
            Self::InvalidJoinCode => "The join code is not a valid 6-16 digit number.",
            Self::UnknownAlternative => "The submitted answer is not one of this round's alternatives.",
            Self::PayloadTooLarge => "The message exceeds the maximum allowed size.",
            Self::InvalidConfig => "The lobby configuration is invalid.",
            Self::MalformedMessage => "The message could not be parsed as a valid frame.",
            Self::RateLimited => "Too many requests in a short time; slow down.",
            Self::Internal => "An internal error occurred.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::LobbyNotFound).unwrap();
        assert_eq!(json, "\"LOBBY_NOT_FOUND\"");
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(
            ErrorCode::AlreadyAnswered.to_string(),
            ErrorCode::AlreadyAnswered.description()
        );
    }

    #[test]
    fn every_variant_has_a_real_description() {
        let codes = [
            ErrorCode::Unauthorized,
            ErrorCode::TokenExpired,
            ErrorCode::TokenUnknown,
            ErrorCode::LobbyNotFound,
            ErrorCode::ParticipantUnknown,
            ErrorCode::QuestionNotFound,
            ErrorCode::InvalidPhase,
            ErrorCode::NoMoreQuestions,
            ErrorCode::LobbyNotJoinable,
            ErrorCode::LobbyClosed,
            ErrorCode::AlreadyAnswered,
            ErrorCode::EmptyCatalog,
            ErrorCode::InvalidName,
            ErrorCode::NameTaken,
            ErrorCode::InvalidJoinCode,
            ErrorCode::UnknownAlternative,
            ErrorCode::PayloadTooLarge,
            ErrorCode::InvalidConfig,
            ErrorCode::MalformedMessage,
            ErrorCode::RateLimited,
            ErrorCode::Internal,
        ];
        for code in codes {
            assert!(code.description().len() > 10, "{code:?} description too short");
        }
    }
}
