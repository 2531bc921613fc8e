//! End-to-end websocket scenarios mirroring spec §8's literal test cases:
//! a full round from join through reveal, and the double-submission
//! rejection case.

mod common;

use common::{spawn_app, ADMIN_PASSWORD};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

async fn create_lobby(base_url: &str) -> (String, String) {
    let client = reqwest::Client::new();
    let created: Value = client
        .post(format!("{base_url}/api/create-lobby"))
        .json(&json!({"admin_password": ADMIN_PASSWORD, "host_name": "Host"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    (
        created["join_code"].as_str().unwrap().to_string(),
        created["host_token"].as_str().unwrap().to_string(),
    )
}

async fn join_lobby(base_url: &str, join_code: &str, name: &str) -> String {
    let client = reqwest::Client::new();
    let joined: Value = client
        .post(format!("{base_url}/api/join-lobby"))
        .json(&json!({"join_code": join_code, "name": name}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    joined["session_token"].as_str().unwrap().to_string()
}

/// Read frames off a socket until one with the given `type` tag arrives, or
/// a few seconds pass without one showing up.
async fn recv_until<S>(socket: &mut S, message_type: &str) -> Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Unpin,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        loop {
            let frame = socket.next().await.expect("socket closed").unwrap();
            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(&text).unwrap();
                if value["type"] == message_type {
                    return value;
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {message_type}"))
}

async fn send_client_message<S>(socket: &mut S, message: Value)
where
    S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    socket
        .send(Message::Text(message.to_string().into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn perfect_score_round_awards_full_points_only_to_the_correct_fast_answer() {
    let app = spawn_app().await;
    let (join_code, host_token) = create_lobby(&app.base_url).await;
    let alice_token = join_lobby(&app.base_url, &join_code, "alice").await;
    let bob_token = join_lobby(&app.base_url, &join_code, "bob").await;

    let (mut host_ws, _) = connect_async(format!("{}/ws?token={host_token}", app.ws_base_url))
        .await
        .unwrap();
    let (mut alice_ws, _) = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url))
        .await
        .unwrap();
    let (mut bob_ws, _) = connect_async(format!("{}/ws?token={bob_token}", app.ws_base_url))
        .await
        .unwrap();

    recv_until(&mut host_ws, "FullState").await;
    recv_until(&mut alice_ws, "FullState").await;
    recv_until(&mut bob_ws, "FullState").await;

    send_client_message(
        &mut host_ws,
        json!({"type": "AdminAction", "data": {"kind": "start_game"}}),
    )
    .await;
    send_client_message(
        &mut host_ws,
        json!({"type": "AdminAction", "data": {"kind": "start_round"}}),
    )
    .await;

    recv_until(&mut alice_ws, "RoundStarted").await;
    recv_until(&mut bob_ws, "RoundStarted").await;

    send_client_message(&mut alice_ws, json!({"type": "Answer", "data": {"text": "Red"}})).await;
    send_client_message(&mut bob_ws, json!({"type": "Answer", "data": {"text": "Blue"}})).await;

    recv_until(&mut alice_ws, "AnswerReceived").await;

    send_client_message(
        &mut host_ws,
        json!({"type": "AdminAction", "data": {"kind": "end_round"}}),
    )
    .await;

    let ended = recv_until(&mut alice_ws, "RoundEnded").await;
    let correct_options: Vec<String> = ended["data"]["correct_options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(correct_options, vec!["Red".to_string()]);

    let per_participant = ended["data"]["per_participant"].as_array().unwrap();
    let alice_row = per_participant
        .iter()
        .find(|row| row["delta"].as_u64().unwrap() >= 4900)
        .expect("alice should have scored close to the full 5000 points");
    assert_eq!(alice_row["total"], alice_row["delta"]);

    let bob_row = per_participant
        .iter()
        .find(|row| row["delta"].as_u64().unwrap() == 0)
        .expect("bob should have scored 0");
    assert_eq!(bob_row["total"], 0);
}

#[tokio::test]
async fn double_submission_is_rejected_with_an_error_frame() {
    let app = spawn_app().await;
    let (join_code, host_token) = create_lobby(&app.base_url).await;
    let alice_token = join_lobby(&app.base_url, &join_code, "alice").await;

    let (mut host_ws, _) = connect_async(format!("{}/ws?token={host_token}", app.ws_base_url))
        .await
        .unwrap();
    let (mut alice_ws, _) = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url))
        .await
        .unwrap();

    recv_until(&mut host_ws, "FullState").await;
    recv_until(&mut alice_ws, "FullState").await;

    send_client_message(
        &mut host_ws,
        json!({"type": "AdminAction", "data": {"kind": "start_game"}}),
    )
    .await;
    send_client_message(
        &mut host_ws,
        json!({"type": "AdminAction", "data": {"kind": "start_round"}}),
    )
    .await;
    recv_until(&mut alice_ws, "RoundStarted").await;

    send_client_message(&mut alice_ws, json!({"type": "Answer", "data": {"text": "Red"}})).await;
    recv_until(&mut alice_ws, "AnswerReceived").await;

    send_client_message(&mut alice_ws, json!({"type": "Answer", "data": {"text": "Blue"}})).await;
    let error = recv_until(&mut alice_ws, "Error").await;
    assert_eq!(error["data"]["code"], "ALREADY_ANSWERED");
}

#[tokio::test]
async fn close_game_from_host_tears_down_the_lobby_and_revokes_every_token() {
    let app = spawn_app().await;
    let (join_code, host_token) = create_lobby(&app.base_url).await;
    let alice_token = join_lobby(&app.base_url, &join_code, "alice").await;

    let (mut host_ws, _) = connect_async(format!("{}/ws?token={host_token}", app.ws_base_url))
        .await
        .unwrap();
    let (mut alice_ws, _) = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url))
        .await
        .unwrap();

    recv_until(&mut host_ws, "FullState").await;
    recv_until(&mut alice_ws, "FullState").await;

    send_client_message(
        &mut host_ws,
        json!({"type": "AdminAction", "data": {"kind": "close_game"}}),
    )
    .await;

    recv_until(&mut alice_ws, "LobbyClosed").await;

    let reconnect = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url)).await;
    assert!(
        reconnect.is_err(),
        "a closed lobby's session tokens must no longer resolve"
    );
}

#[tokio::test]
async fn close_game_from_a_non_host_is_rejected_and_leaves_the_lobby_open() {
    let app = spawn_app().await;
    let (join_code, _host_token) = create_lobby(&app.base_url).await;
    let alice_token = join_lobby(&app.base_url, &join_code, "alice").await;

    let (mut alice_ws, _) = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url))
        .await
        .unwrap();
    recv_until(&mut alice_ws, "FullState").await;

    send_client_message(
        &mut alice_ws,
        json!({"type": "AdminAction", "data": {"kind": "close_game"}}),
    )
    .await;

    let error = recv_until(&mut alice_ws, "Error").await;
    assert_eq!(error["data"]["code"], "UNAUTHORIZED");

    // The lobby is still live: a fresh join against the same code succeeds.
    join_lobby(&app.base_url, &join_code, "bob").await;
}

#[tokio::test]
async fn explicit_leave_revokes_the_session_token() {
    let app = spawn_app().await;
    let (join_code, _host_token) = create_lobby(&app.base_url).await;
    let alice_token = join_lobby(&app.base_url, &join_code, "alice").await;

    let (mut alice_ws, _) = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url))
        .await
        .unwrap();
    recv_until(&mut alice_ws, "FullState").await;

    send_client_message(&mut alice_ws, json!({"type": "Leave"})).await;

    // Wait for the server to process the close and revoke the token before
    // attempting to reuse it.
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        loop {
            let reconnect =
                connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url)).await;
            if reconnect.is_err() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("the session token should stop resolving shortly after Leave");
}

#[tokio::test]
async fn heartbeat_is_answered_with_pong() {
    let app = spawn_app().await;
    let (join_code, _host_token) = create_lobby(&app.base_url).await;
    let alice_token = join_lobby(&app.base_url, &join_code, "alice").await;

    let (mut alice_ws, _) = connect_async(format!("{}/ws?token={alice_token}", app.ws_base_url))
        .await
        .unwrap();
    recv_until(&mut alice_ws, "FullState").await;

    send_client_message(&mut alice_ws, json!({"type": "Heartbeat"})).await;
    recv_until(&mut alice_ws, "Pong").await;
}
