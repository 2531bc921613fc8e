//! Per-connection inbound message rate limiting (§4.5, §6): each attached
//! connection gets its own sliding one-second window so a chatty client only
//! ever throttles itself, never its lobby-mates.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tracks the timestamps of recent inbound messages for a single connection
/// and rejects once more than `limit_per_sec` have landed in the last second.
#[derive(Debug)]
pub struct InboundRateLimiter {
    timestamps: VecDeque<Instant>,
    limit_per_sec: u32,
}

impl InboundRateLimiter {
    pub fn new(limit_per_sec: u32) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(limit_per_sec as usize + 1),
            limit_per_sec,
        }
    }

    /// Record one inbound message "now" and report whether it's within the
    /// configured rate. Rejected messages are not retroactively un-recorded:
    /// a client spamming past the cap keeps getting rejected until the
    /// window drains, rather than being let back in early.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        let window = Duration::from_secs(1);
        while let Some(&front) = self.timestamps.front() {
            if now.duration_since(front) > window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.limit_per_sec as usize {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }
}
