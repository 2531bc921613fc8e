//! In-process counters for the lobby engine. No histograms, no cross-instance
//! aggregation: a single process owns all lobbies (§5), so plain atomics
//! exposed as a Prometheus text snippet are enough.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, shared behind an `Arc` by every lobby and the
/// connection hub.
#[derive(Debug, Default)]
pub struct Metrics {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub connections_force_closed: AtomicU64,

    pub lobbies_created: AtomicU64,
    pub lobbies_closed: AtomicU64,
    pub join_code_collisions: AtomicU64,

    pub participants_joined: AtomicU64,
    pub rounds_started: AtomicU64,
    pub rounds_ended: AtomicU64,
    pub answers_submitted: AtomicU64,
    pub answers_rejected: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connection_force_closed(&self) {
        self.connections_force_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Render as Prometheus text exposition format (`GET /metrics`, §6).
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.samples() {
            out.push_str(&format!(
                "# TYPE spektrum_{name} counter\nspektrum_{name} {value}\n"
            ));
        }
        out
    }

    fn samples(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("connections_total", self.connections_total.load(Ordering::Relaxed)),
            ("connections_active", self.connections_active.load(Ordering::Relaxed)),
            (
                "connections_force_closed",
                self.connections_force_closed.load(Ordering::Relaxed),
            ),
            ("lobbies_created", self.lobbies_created.load(Ordering::Relaxed)),
            ("lobbies_closed", self.lobbies_closed.load(Ordering::Relaxed)),
            (
                "join_code_collisions",
                self.join_code_collisions.load(Ordering::Relaxed),
            ),
            (
                "participants_joined",
                self.participants_joined.load(Ordering::Relaxed),
            ),
            ("rounds_started", self.rounds_started.load(Ordering::Relaxed)),
            ("rounds_ended", self.rounds_ended.load(Ordering::Relaxed)),
            (
                "answers_submitted",
                self.answers_submitted.load(Ordering::Relaxed),
            ),
            (
                "answers_rejected",
                self.answers_rejected.load(Ordering::Relaxed),
            ),
        ]
    }
}
