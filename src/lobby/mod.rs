//! The lobby actor (§4.3): one task per live lobby, owning all of its state
//! behind a single serial command queue. There is no lock on lobby state —
//! mutual exclusion falls out of the mailbox being consumed by exactly one
//! task, and the mailbox's arrival order is the tiebreaker for anything that
//! happens "at the same time" (§5).

pub mod command;
mod scoring;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::RngExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::catalog::selection::normalize_color;
use crate::catalog::types::{QuestionId, QuestionKind, QuestionSetId};
use crate::catalog::Catalog;
use crate::metrics::Metrics;
use crate::protocol::{
    FinalScoreEntry, FullState, LobbyId, ParticipantId, ParticipantPoints, ParticipantSnapshot,
    Phase, RoundSnapshot, ServerMessage,
};

pub use command::{Command, LobbyError};

/// Bound on the lobby's own mailbox. This is a control queue, not the
/// per-connection fan-out path (§4.5), so a generous bound that only ever
/// matters under pathological client misbehavior is fine.
const MAILBOX_CAPACITY: usize = 1024;

/// How many on-screen alternatives a round shows, including the correct
/// answer (§4.1, §8).
const ALTERNATIVES_PER_ROUND: usize = 6;

/// A lightweight, cloneable handle used by the connection hub and the
/// registry to talk to a lobby actor without touching its state directly.
#[derive(Clone)]
pub struct LobbyHandle {
    pub id: LobbyId,
    pub join_code: String,
    tx: mpsc::Sender<Command>,
}

/// Point-in-time facts the registry needs for idle sweeping (§4.4), obtained
/// without blocking on the lobby's own processing.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot {
    pub phase: Phase,
    pub idle_for: Duration,
    pub participant_count: usize,
}

impl LobbyHandle {
    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, LobbyError>>) -> Command,
    ) -> Result<T, LobbyError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| LobbyError::Closed)?;
        rx.await.map_err(|_| LobbyError::Closed)?
    }

    pub async fn join(&self, name: String) -> Result<ParticipantId, LobbyError> {
        self.call(|reply| Command::Join { name, reply }).await
    }

    pub async fn attach(
        &self,
        participant_id: ParticipantId,
        outbox: mpsc::Sender<Arc<ServerMessage>>,
    ) -> Result<(), LobbyError> {
        self.call(|reply| Command::Attach {
            participant_id,
            outbox,
            reply,
        })
        .await
    }

    /// Fire-and-forget: the connection hub calls this when a socket drops.
    pub async fn detach(&self, participant_id: ParticipantId) {
        let _ = self.tx.send(Command::Detach { participant_id }).await;
    }

    pub async fn submit_answer(
        &self,
        participant_id: ParticipantId,
        text: String,
    ) -> Result<(), LobbyError> {
        self.call(|reply| Command::SubmitAnswer {
            participant_id,
            text,
            reply,
        })
        .await
    }

    pub async fn start_game(&self, issuer: ParticipantId) -> Result<(), LobbyError> {
        self.call(|reply| Command::StartGame { issuer, reply }).await
    }

    pub async fn start_round(&self, issuer: ParticipantId) -> Result<(), LobbyError> {
        self.call(|reply| Command::StartRound { issuer, reply }).await
    }

    pub async fn end_round(&self, issuer: ParticipantId) -> Result<(), LobbyError> {
        self.call(|reply| Command::EndRound { issuer, reply }).await
    }

    pub async fn skip_question(&self, issuer: ParticipantId) -> Result<(), LobbyError> {
        self.call(|reply| Command::SkipQuestion { issuer, reply })
            .await
    }

    pub async fn end_game(&self, issuer: ParticipantId) -> Result<(), LobbyError> {
        self.call(|reply| Command::EndGame { issuer, reply }).await
    }

    pub async fn close(&self, issuer: ParticipantId) -> Result<(), LobbyError> {
        self.call(|reply| Command::CloseLobby { issuer, reply })
            .await
    }

    pub async fn remove_participant(
        &self,
        issuer: ParticipantId,
        target: ParticipantId,
    ) -> Result<(), LobbyError> {
        self.call(|reply| Command::RemoveParticipant {
            issuer,
            target,
            reply,
        })
        .await
    }

    pub async fn status(&self) -> Option<StatusSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::QueryStatus { reply }).await.ok()?;
        rx.await.ok()
    }
}

struct ParticipantState {
    name: String,
    is_host: bool,
    score: u32,
    last_round_score: u32,
    has_answered: bool,
    outbox: Option<mpsc::Sender<Arc<ServerMessage>>>,
}

impl ParticipantState {
    fn is_attached(&self) -> bool {
        self.outbox.is_some()
    }
}

struct AnswerRecord {
    awarded_points: u32,
}

struct Round {
    question_id: QuestionId,
    displayed_alternatives: Vec<String>,
    correct_options: Vec<String>,
    started_at: Instant,
    started_at_wall: DateTime<Utc>,
    duration_ms: u64,
    answers: HashMap<ParticipantId, AnswerRecord>,
}

/// The actor's private state. Never shared: every field is only ever
/// touched from inside [`Lobby::run`].
pub struct Lobby {
    id: LobbyId,
    join_code: String,
    catalog: Arc<Catalog>,
    metrics: Arc<Metrics>,
    set_id: Option<QuestionSetId>,
    round_duration_ms: u64,
    host_id: ParticipantId,
    phase: Phase,
    participants: HashMap<ParticipantId, ParticipantState>,
    order: Vec<ParticipantId>,
    upcoming: VecDeque<QuestionId>,
    current_round: Option<Round>,
    last_activity: Instant,
    self_tx: mpsc::Sender<Command>,
}

/// Parameters needed to stand up a new lobby actor (§4.3, §4.4).
pub struct LobbySpec {
    pub id: LobbyId,
    pub join_code: String,
    pub host_id: ParticipantId,
    pub host_name: String,
    pub set_id: Option<QuestionSetId>,
    pub round_duration_ms: u64,
    pub catalog: Arc<Catalog>,
    pub metrics: Arc<Metrics>,
}

impl Lobby {
    /// Spawn the actor task and return a handle to it. The host is seeded as
    /// the lobby's first (and permanently privileged) participant; hosts do
    /// not go through [`Command::Join`] (§3 invariant 1: the host is
    /// immutable).
    pub fn spawn(spec: LobbySpec) -> LobbyHandle {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);

        let mut participants = HashMap::new();
        participants.insert(
            spec.host_id,
            ParticipantState {
                name: spec.host_name,
                is_host: true,
                score: 0,
                last_round_score: 0,
                has_answered: false,
                outbox: None,
            },
        );

        let lobby = Lobby {
            id: spec.id,
            join_code: spec.join_code.clone(),
            catalog: spec.catalog,
            metrics: spec.metrics,
            set_id: spec.set_id,
            round_duration_ms: spec.round_duration_ms,
            host_id: spec.host_id,
            phase: Phase::Lobby,
            participants,
            order: vec![spec.host_id],
            upcoming: VecDeque::new(),
            current_round: None,
            last_activity: Instant::now(),
            self_tx: tx.clone(),
        };

        let handle = LobbyHandle {
            id: spec.id,
            join_code: spec.join_code,
            tx,
        };
        tokio::spawn(lobby.run(rx));
        handle
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        tracing::info!(lobby_id = %self.id, "lobby actor started");
        while let Some(command) = rx.recv().await {
            if self.apply(command) {
                break;
            }
        }
        while let Ok(command) = rx.try_recv() {
            command.reject_closed();
        }
        tracing::info!(lobby_id = %self.id, "lobby actor exiting");
    }

    /// Apply one command to the state machine. Returns `true` when the
    /// lobby has just been closed and the actor should stop.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Join { name, reply } => {
                let _ = reply.send(self.handle_join(name));
            }
            Command::Attach {
                participant_id,
                outbox,
                reply,
            } => {
                let _ = reply.send(self.handle_attach(participant_id, outbox));
            }
            Command::Detach { participant_id } => {
                self.handle_detach(participant_id);
            }
            Command::SubmitAnswer {
                participant_id,
                text,
                reply,
            } => {
                let _ = reply.send(self.handle_submit_answer(participant_id, text));
            }
            Command::StartGame { issuer, reply } => {
                let _ = reply.send(self.handle_start_game(issuer));
            }
            Command::StartRound { issuer, reply } => {
                let _ = reply.send(self.handle_start_round(issuer));
            }
            Command::EndRound { issuer, reply } => {
                let _ = reply.send(self.handle_end_round(issuer));
            }
            Command::SkipQuestion { issuer, reply } => {
                let _ = reply.send(self.handle_skip_question(issuer));
            }
            Command::EndGame { issuer, reply } => {
                let _ = reply.send(self.handle_end_game(issuer));
            }
            Command::RemoveParticipant {
                issuer,
                target,
                reply,
            } => {
                let _ = reply.send(self.handle_remove_participant(issuer, target));
            }
            Command::Tick { round_started_at } => {
                self.handle_tick(round_started_at);
            }
            Command::QueryStatus { reply } => {
                let _ = reply.send(self.status_snapshot());
            }
            Command::CloseLobby { issuer, reply } => {
                return self.handle_close(issuer, reply);
            }
        }
        false
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn is_host(&self, participant: ParticipantId) -> bool {
        self.host_id == participant
    }

    fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: self.phase,
            idle_for: self.last_activity.elapsed(),
            participant_count: self.participants.len(),
        }
    }

    /// Fan-out with a full connection-hub queue force-closes that
    /// connection rather than stalling the lobby or silently dropping the
    /// message (§4.5, §9): a slow consumer that's still acking pings would
    /// otherwise never be caught by the heartbeat path. Clearing `outbox`
    /// drops the hub's sender, which closes `outbox_rx` on the connection
    /// task and tears the socket down.
    fn broadcast(&mut self, message: ServerMessage) {
        let message = Arc::new(message);
        for participant in self.participants.values_mut() {
            let Some(outbox) = &participant.outbox else {
                continue;
            };
            if let Err(mpsc::error::TrySendError::Full(_)) = outbox.try_send(Arc::clone(&message))
            {
                participant.outbox = None;
            }
        }
    }

    fn send_to(&mut self, participant_id: ParticipantId, message: ServerMessage) {
        if let Some(participant) = self.participants.get_mut(&participant_id) {
            let Some(outbox) = &participant.outbox else {
                return;
            };
            if let Err(mpsc::error::TrySendError::Full(_)) = outbox.try_send(Arc::new(message)) {
                participant.outbox = None;
            }
        }
    }

    fn full_state(&self) -> FullState {
        let participants = self
            .order
            .iter()
            .filter_map(|id| self.participants.get(id).map(|p| (*id, p)))
            .map(|(id, p)| ParticipantSnapshot {
                participant_id: id,
                name: p.name.clone(),
                score: p.score,
                last_round_score: p.last_round_score,
                is_host: p.is_host,
                is_attached: p.is_attached(),
                has_answered: p.has_answered,
            })
            .collect();

        let current_round = self.current_round.as_ref().map(|round| RoundSnapshot {
            question_id: round.question_id,
            alternatives: round.displayed_alternatives.clone(),
            duration_ms: round.duration_ms,
            server_started_at: round.started_at_wall,
        });

        FullState {
            lobby_id: self.id,
            join_code: self.join_code.clone(),
            phase: self.phase,
            round_duration_ms: self.round_duration_ms,
            participants,
            current_round,
            questions_remaining: self.upcoming.len(),
        }
    }

    fn handle_join(&mut self, name: String) -> Result<ParticipantId, LobbyError> {
        if !self.phase.is_joinable() {
            return Err(LobbyError::NotJoinable);
        }
        if self.participants.values().any(|p| p.name == name) {
            return Err(LobbyError::NameTaken);
        }
        let participant_id = ParticipantId::new_v4();
        self.participants.insert(
            participant_id,
            ParticipantState {
                name: name.clone(),
                is_host: false,
                score: 0,
                last_round_score: 0,
                has_answered: false,
                outbox: None,
            },
        );
        self.order.push(participant_id);
        self.touch();
        self.metrics
            .participants_joined
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.broadcast(ServerMessage::ParticipantJoined {
            participant_id,
            name,
        });
        Ok(participant_id)
    }

    fn handle_attach(
        &mut self,
        participant_id: ParticipantId,
        outbox: mpsc::Sender<Arc<ServerMessage>>,
    ) -> Result<(), LobbyError> {
        if !self.participants.contains_key(&participant_id) {
            return Err(LobbyError::ParticipantUnknown);
        }
        let snapshot = ServerMessage::FullState(self.full_state());
        let participant = self.participants.get_mut(&participant_id).unwrap();
        participant.outbox = Some(outbox);
        self.touch();
        self.send_to(participant_id, snapshot);
        Ok(())
    }

    fn handle_detach(&mut self, participant_id: ParticipantId) {
        if let Some(participant) = self.participants.get_mut(&participant_id) {
            participant.outbox = None;
        }
    }

    fn handle_submit_answer(
        &mut self,
        participant_id: ParticipantId,
        text: String,
    ) -> Result<(), LobbyError> {
        if self.phase != Phase::Question {
            return Err(LobbyError::InvalidPhase);
        }
        if !self.participants.contains_key(&participant_id) {
            return Err(LobbyError::ParticipantUnknown);
        }
        let elapsed_ms = {
            let round = self.current_round.as_ref().expect("phase is Question");
            round.started_at.elapsed().as_millis() as i64
        };
        let round = self.current_round.as_mut().expect("phase is Question");
        if round.answers.contains_key(&participant_id) {
            self.metrics
                .answers_rejected
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            return Err(LobbyError::AlreadyAnswered);
        }
        if !round.displayed_alternatives.contains(&text) {
            self.metrics
                .answers_rejected
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            return Err(LobbyError::UnknownAlternative);
        }
        let correct = round.correct_options.contains(&text);
        let awarded = scoring::award_points(correct, elapsed_ms, round.duration_ms);
        round
            .answers
            .insert(participant_id, AnswerRecord { awarded_points: awarded });
        if let Some(participant) = self.participants.get_mut(&participant_id) {
            participant.has_answered = true;
        }
        self.touch();
        self.metrics
            .answers_submitted
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.broadcast(ServerMessage::AnswerReceived { participant_id });
        Ok(())
    }

    fn handle_start_game(&mut self, issuer: ParticipantId) -> Result<(), LobbyError> {
        if !self.is_host(issuer) {
            return Err(LobbyError::Unauthorized);
        }
        if self.phase != Phase::Lobby {
            return Err(LobbyError::InvalidPhase);
        }
        let mut ids = self
            .catalog
            .question_ids_for_set(self.set_id)
            .map_err(|_| LobbyError::EmptyCatalog)?;
        ids.shuffle(&mut rand::rng());
        self.upcoming = ids.into();
        self.phase = Phase::Score;
        self.touch();
        self.broadcast(ServerMessage::PhaseChanged { phase: self.phase });
        Ok(())
    }

    fn handle_start_round(&mut self, issuer: ParticipantId) -> Result<(), LobbyError> {
        if !self.is_host(issuer) {
            return Err(LobbyError::Unauthorized);
        }
        if !matches!(self.phase, Phase::Lobby | Phase::Score) {
            return Err(LobbyError::InvalidPhase);
        }
        let question_id = self.upcoming.pop_front().ok_or(LobbyError::NoMoreQuestions)?;
        let question = self
            .catalog
            .lookup_question(question_id)
            .map_err(|_| LobbyError::NoMoreQuestions)?;
        let options = self.catalog.options_for(question_id);
        let correct_options: Vec<String> = options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| normalize_for(question.kind, &o.text))
            .collect();
        let seed: u64 = rand::rng().random();
        let displayed_alternatives = self
            .catalog
            .sample_alternatives(question_id, ALTERNATIVES_PER_ROUND, seed)
            .map_err(|_| LobbyError::NoMoreQuestions)?;

        for participant in self.participants.values_mut() {
            participant.has_answered = false;
        }

        let started_at = Instant::now();
        let started_at_wall = Utc::now();
        let duration_ms = self.round_duration_ms;
        self.current_round = Some(Round {
            question_id,
            displayed_alternatives: displayed_alternatives.clone(),
            correct_options,
            started_at,
            started_at_wall,
            duration_ms,
            answers: HashMap::new(),
        });
        self.phase = Phase::Question;
        self.touch();
        self.metrics
            .rounds_started
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        self.schedule_tick(started_at_wall, duration_ms);

        self.broadcast(ServerMessage::PhaseChanged { phase: self.phase });
        self.broadcast(ServerMessage::RoundStarted {
            question_id,
            alternatives: displayed_alternatives,
            duration_ms,
            server_started_at: started_at_wall,
        });
        Ok(())
    }

    fn schedule_tick(&self, round_started_at: DateTime<Utc>, duration_ms: u64) {
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            let _ = tx.send(Command::Tick { round_started_at }).await;
        });
    }

    fn handle_tick(&mut self, round_started_at: DateTime<Utc>) {
        let still_live = self
            .current_round
            .as_ref()
            .is_some_and(|round| round.started_at_wall == round_started_at);
        if self.phase == Phase::Question && still_live {
            self.end_current_round();
        }
    }

    fn handle_end_round(&mut self, issuer: ParticipantId) -> Result<(), LobbyError> {
        if !self.is_host(issuer) {
            return Err(LobbyError::Unauthorized);
        }
        // Idempotent once applied (§8): a second EndRound after the phase
        // has already moved to Score is a no-op, not an error.
        if self.phase != Phase::Question {
            return Ok(());
        }
        self.end_current_round();
        Ok(())
    }

    fn end_current_round(&mut self) {
        let round = match self.current_round.take() {
            Some(round) => round,
            None => return,
        };
        let mut per_participant = Vec::with_capacity(self.order.len());
        for id in &self.order {
            if let Some(participant) = self.participants.get_mut(id) {
                let delta = round
                    .answers
                    .get(id)
                    .map(|a| a.awarded_points)
                    .unwrap_or(0);
                participant.score += delta;
                participant.last_round_score = delta;
                per_participant.push(ParticipantPoints {
                    participant_id: *id,
                    delta,
                    total: participant.score,
                });
            }
        }
        self.phase = Phase::Score;
        self.touch();
        self.metrics
            .rounds_ended
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.broadcast(ServerMessage::RoundEnded {
            correct_options: round.correct_options,
            per_participant,
        });
        self.broadcast(ServerMessage::PhaseChanged { phase: self.phase });
    }

    fn handle_skip_question(&mut self, issuer: ParticipantId) -> Result<(), LobbyError> {
        if !self.is_host(issuer) {
            return Err(LobbyError::Unauthorized);
        }
        if !matches!(self.phase, Phase::Lobby | Phase::Score) {
            return Err(LobbyError::InvalidPhase);
        }
        self.upcoming.pop_front();
        self.touch();
        Ok(())
    }

    fn handle_end_game(&mut self, issuer: ParticipantId) -> Result<(), LobbyError> {
        if !self.is_host(issuer) {
            return Err(LobbyError::Unauthorized);
        }
        if self.phase == Phase::GameOver {
            return Ok(());
        }
        self.current_round = None;
        self.upcoming.clear();
        self.phase = Phase::GameOver;
        self.touch();

        let mut final_scoreboard: Vec<FinalScoreEntry> = self
            .order
            .iter()
            .filter_map(|id| self.participants.get(id).map(|p| (*id, p)))
            .map(|(id, p)| FinalScoreEntry {
                participant_id: id,
                name: p.name.clone(),
                score: p.score,
            })
            .collect();
        final_scoreboard.sort_by(|a, b| b.score.cmp(&a.score));

        self.broadcast(ServerMessage::GameEnded { final_scoreboard });
        self.broadcast(ServerMessage::PhaseChanged { phase: self.phase });
        Ok(())
    }

    fn handle_remove_participant(
        &mut self,
        issuer: ParticipantId,
        target: ParticipantId,
    ) -> Result<(), LobbyError> {
        if self.phase == Phase::GameOver {
            return Err(LobbyError::InvalidPhase);
        }
        if target == self.host_id {
            return Err(LobbyError::Unauthorized);
        }
        if !self.is_host(issuer) && issuer != target {
            return Err(LobbyError::Unauthorized);
        }
        if self.participants.remove(&target).is_none() {
            return Err(LobbyError::ParticipantUnknown);
        }
        self.order.retain(|id| *id != target);
        if let Some(round) = self.current_round.as_mut() {
            round.answers.remove(&target);
        }
        self.touch();
        self.broadcast(ServerMessage::ParticipantLeft {
            participant_id: target,
        });
        Ok(())
    }

    fn handle_close(&mut self, issuer: ParticipantId, reply: oneshot::Sender<Result<(), LobbyError>>) -> bool {
        if !self.is_host(issuer) {
            let _ = reply.send(Err(LobbyError::Unauthorized));
            return false;
        }
        self.metrics
            .lobbies_closed
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.broadcast(ServerMessage::LobbyClosed {
            reason: "the host closed the lobby".to_string(),
        });
        let _ = reply.send(Ok(()));
        true
    }
}

/// Apply the same color normalization used for distractor sampling when
/// comparing a submitted answer against the canonical correct option, so
/// "Gold" and "gold" (or a confusable color grouped with a differently
/// spelled canonical entry) compare the way the displayed alternatives do.
fn normalize_for(kind: QuestionKind, text: &str) -> String {
    if kind == QuestionKind::Color {
        normalize_color(text)
    } else {
        text.to_string()
    }
}
