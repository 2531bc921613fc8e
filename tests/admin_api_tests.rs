//! HTTP AdminAPI integration tests (§4.6, §6).

mod common;

use axum::http::StatusCode;
use common::{fixture_router, ADMIN_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn list_sets_returns_empty_for_a_fresh_catalog() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let response = server.get("/api/list-sets").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["sets"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_lobby_rejects_wrong_admin_password() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let response = server
        .post("/api/create-lobby")
        .json(&json!({
            "admin_password": "wrong",
            "host_name": "Host",
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_lobby_then_join_lobby_succeeds() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let create_response = server
        .post("/api/create-lobby")
        .json(&json!({
            "admin_password": ADMIN_PASSWORD,
            "host_name": "Host",
        }))
        .await;
    create_response.assert_status_ok();
    let created: serde_json::Value = create_response.json();
    let join_code = created["join_code"].as_str().unwrap().to_string();
    assert!(!created["host_token"].as_str().unwrap().is_empty());

    let join_response = server
        .post("/api/join-lobby")
        .json(&json!({
            "join_code": join_code,
            "name": "alice",
        }))
        .await;
    join_response.assert_status_ok();
    let joined: serde_json::Value = join_response.json();
    assert_eq!(joined["join_code"], join_code);
    assert!(!joined["session_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn join_lobby_rejects_unknown_join_code() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let response = server
        .post("/api/join-lobby")
        .json(&json!({
            "join_code": "000000",
            "name": "alice",
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn join_lobby_rejects_invalid_name() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let created: serde_json::Value = server
        .post("/api/create-lobby")
        .json(&json!({
            "admin_password": ADMIN_PASSWORD,
            "host_name": "Host",
        }))
        .await
        .json();
    let join_code = created["join_code"].as_str().unwrap().to_string();

    let response = server
        .post("/api/join-lobby")
        .json(&json!({
            "join_code": join_code,
            "name": "a",
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn second_join_with_same_name_is_rejected() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let created: serde_json::Value = server
        .post("/api/create-lobby")
        .json(&json!({"admin_password": ADMIN_PASSWORD, "host_name": "Host"}))
        .await
        .json();
    let join_code = created["join_code"].as_str().unwrap().to_string();

    let first = server
        .post("/api/join-lobby")
        .json(&json!({"join_code": join_code, "name": "alice"}))
        .await;
    first.assert_status_ok();

    let second = server
        .post("/api/join-lobby")
        .json(&json!({"join_code": join_code, "name": "alice"}))
        .await;
    second.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn metrics_endpoint_renders_prometheus_text() {
    let server = axum_test::TestServer::new(fixture_router()).unwrap();

    let response = server.get("/metrics").await;

    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("spektrum_lobbies_created"));
}
