#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! # Spektrum
//!
//! A real-time, room-based multiplayer music-quiz server. A host stands up
//! a lobby, players join with a six-digit code, and everyone answers each
//! round over a websocket while the lobby actor keeps score.

/// Immutable question/media/set catalog, loaded once at startup
pub mod catalog;

/// Server configuration and environment variables
pub mod config;

/// Error taxonomy shared by the AdminAPI and the websocket protocol
pub mod error;

/// The lobby actor: one task per live game, owning all of its state
pub mod lobby;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// WebSocket message protocol definitions
pub mod protocol;

/// Per-connection inbound message rate limiting
pub mod rate_limit;

/// LobbyRegistry: join-code resolution and idle-lobby reaping
pub mod registry;

/// HTTP/WebSocket wiring: AdminAPI and ConnectionHub
pub mod server;

/// TokenMint: opaque session/admission token issuance and resolution
pub mod tokens;
