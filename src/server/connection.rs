//! ConnectionHub (C5, §4.5): the duplex pump between one websocket and the
//! lobby actor its session token is bound to.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::ErrorCode;
use crate::lobby::LobbyHandle;
use crate::protocol::{AdminActionKind, ClientMessage, ParticipantId, ServerMessage};
use crate::rate_limit::InboundRateLimiter;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    token: String,
}

/// Upgrade handler: resolve the session token up front, before performing
/// the websocket handshake, so an invalid or expired token never costs a
/// connection slot (§4.2, §4.5).
pub async fn websocket_handler(
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let binding = match state.tokens.resolve(&query.token).await {
        Ok(binding) => binding,
        Err(err) => {
            return (
                axum::http::StatusCode::UNAUTHORIZED,
                err.code().description().to_string(),
            )
                .into_response()
        }
    };

    let handle = match state.registry.resolve_by_id(binding.lobby_id) {
        Ok(handle) => handle,
        Err(err) => {
            return (
                axum::http::StatusCode::NOT_FOUND,
                err.code().description().to_string(),
            )
                .into_response()
        }
    };

    state.metrics.connection_opened();

    ws.on_upgrade(move |socket| {
        run_connection(socket, state, handle, binding.participant_id, query.token)
    })
}

async fn run_connection(
    socket: WebSocket,
    state: AppState,
    lobby: LobbyHandle,
    participant_id: ParticipantId,
    token: String,
) {
    let (mut sink, mut stream) = socket.split();
    let (outbox_tx, mut outbox_rx) =
        mpsc::channel::<Arc<ServerMessage>>(state.config.websocket.outbound_queue_capacity);

    if lobby.attach(participant_id, outbox_tx).await.is_err() {
        let _ = sink.send(Message::Close(None)).await;
        return;
    }

    let ping_interval = Duration::from_secs(state.config.server.ping_interval_secs);
    let ping_timeout = Duration::from_secs(state.config.server.ping_timeout_secs);
    let mut rate_limiter =
        InboundRateLimiter::new(state.config.websocket.max_inbound_messages_per_sec);
    let max_inbound_bytes = state.config.websocket.max_inbound_message_bytes;

    let mut ticker = tokio::time::interval(ping_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_activity = tokio::time::Instant::now();

    loop {
        tokio::select! {
            outbound = outbox_rx.recv() => {
                match outbound {
                    Some(message) => {
                        let Ok(text) = serde_json::to_string(message.as_ref()) else {
                            continue;
                        };
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        last_activity = tokio::time::Instant::now();
                        if text.len() > max_inbound_bytes {
                            send_error(&mut sink, ErrorCode::PayloadTooLarge).await;
                            continue;
                        }
                        if !rate_limiter.check() {
                            send_error(&mut sink, ErrorCode::RateLimited).await;
                            continue;
                        }
                        if !handle_inbound(&text, &state, &lobby, participant_id, &token, &mut sink).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        last_activity = tokio::time::Instant::now();
                        send_error(&mut sink, ErrorCode::PayloadTooLarge).await;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_activity = tokio::time::Instant::now();
                    }
                    Some(Ok(Message::Ping(_))) => {
                        last_activity = tokio::time::Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                }
            }
            _ = ticker.tick() => {
                if last_activity.elapsed() > ping_timeout {
                    state.metrics.connection_force_closed();
                    break;
                }
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    lobby.detach(participant_id).await;
    state.metrics.connection_closed();
}

/// Parse and route one inbound frame. Returns `false` if the connection
/// should be torn down (an explicit `Leave`, a successful `CloseGame`, or
/// a frame that failed to parse).
async fn handle_inbound(
    text: &str,
    state: &AppState,
    lobby: &LobbyHandle,
    participant_id: ParticipantId,
    token: &str,
    sink: &mut SplitSink<WebSocket, Message>,
) -> bool {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(_) => {
            // A malformed frame closes the connection rather than leaving
            // the peer attached in an unparseable state (§7).
            send_error(sink, ErrorCode::MalformedMessage).await;
            return false;
        }
    };

    match message {
        ClientMessage::Answer { text } => {
            if let Err(err) = lobby.submit_answer(participant_id, text).await {
                send_error(sink, err.code()).await;
            }
        }
        ClientMessage::Leave => {
            // Explicit leave is one of the three revocation triggers (§4.2).
            // Self-removal is a no-op for the host (`remove_participant`
            // refuses to remove the host), which matches §8 scenario 6: a
            // host can only vacate the lobby by disconnecting, never by
            // freeing their own privileged slot.
            let _ = lobby.remove_participant(participant_id, participant_id).await;
            state.tokens.revoke(token).await;
            return false;
        }
        ClientMessage::AdminAction { kind } => match kind {
            AdminActionKind::StartGame => {
                if let Err(err) = lobby.start_game(participant_id).await {
                    send_error(sink, err.code()).await;
                }
            }
            AdminActionKind::StartRound => {
                if let Err(err) = lobby.start_round(participant_id).await {
                    send_error(sink, err.code()).await;
                }
            }
            AdminActionKind::EndRound => {
                if let Err(err) = lobby.end_round(participant_id).await {
                    send_error(sink, err.code()).await;
                }
            }
            AdminActionKind::SkipQuestion => {
                if let Err(err) = lobby.skip_question(participant_id).await {
                    send_error(sink, err.code()).await;
                }
            }
            AdminActionKind::EndGame => {
                if let Err(err) = lobby.end_game(participant_id).await {
                    send_error(sink, err.code()).await;
                }
            }
            AdminActionKind::CloseGame => {
                match state
                    .registry
                    .close_lobby(lobby.id, participant_id, &state.tokens)
                    .await
                {
                    Ok(()) => return false,
                    Err(err) => send_error(sink, err.code()).await,
                }
            }
        },
        ClientMessage::Heartbeat => {
            let pong = serde_json::to_string(&ServerMessage::Pong).unwrap_or_default();
            let _ = sink.send(Message::Text(pong.into())).await;
        }
    }
    true
}

async fn send_error(sink: &mut SplitSink<WebSocket, Message>, code: ErrorCode) {
    let message = ServerMessage::Error {
        code,
        message: code.description().to_string(),
    };
    if let Ok(text) = serde_json::to_string(&message) {
        let _ = sink.send(Message::Text(text.into())).await;
    }
}
