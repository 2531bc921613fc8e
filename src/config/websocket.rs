//! Connection hub (duplex channel) configuration.

use super::defaults::{
    default_max_inbound_message_bytes, default_max_inbound_messages_per_sec,
    default_outbound_queue_capacity,
};
use serde::{Deserialize, Serialize};

/// ConnectionHub tunables (§4.5).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebSocketConfig {
    /// Bounded outbound queue capacity per connection; a full queue force-closes
    /// the connection rather than blocking the owning lobby.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Maximum accepted inbound message size, in bytes.
    #[serde(default = "default_max_inbound_message_bytes")]
    pub max_inbound_message_bytes: usize,
    /// Maximum accepted inbound message rate per connection, in messages/second.
    #[serde(default = "default_max_inbound_messages_per_sec")]
    pub max_inbound_messages_per_sec: u32,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
            max_inbound_message_bytes: default_max_inbound_message_bytes(),
            max_inbound_messages_per_sec: default_max_inbound_messages_per_sec(),
        }
    }
}
