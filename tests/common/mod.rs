//! Shared scaffolding for the integration tests: spins up the full HTTP +
//! WebSocket surface on an ephemeral port against an in-memory fixture
//! catalog, mirroring how `main` assembles the process in production.

use std::sync::Arc;

use spektrum_server::catalog::types::{
    CatalogDocument, Media, Question, QuestionKind, QuestionOption,
};
use spektrum_server::catalog::Catalog;
use spektrum_server::config::Config;
use spektrum_server::metrics::Metrics;
use spektrum_server::registry::LobbyRegistry;
use spektrum_server::server::{build_router, AppState};
use spektrum_server::tokens::TokenMint;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "test-admin-password";

pub struct SpawnedApp {
    pub base_url: String,
    pub ws_base_url: String,
}

/// One color question (correct option `"Red"`, five distractors), matching
/// the scenario in spec §8 #1.
fn fixture_document() -> CatalogDocument {
    let media_id = Uuid::new_v4();
    let question_id = Uuid::new_v4();

    CatalogDocument {
        media: vec![Media {
            id: media_id,
            title: "Test Song".into(),
            artist: "Test Artist".into(),
            release_year: None,
            youtube_id: "abc123".into(),
            spotify_uri: None,
        }],
        questions: vec![Question {
            id: question_id,
            kind: QuestionKind::Color,
            prompt_text: None,
            image_url: None,
            media_id,
            active: true,
        }],
        options: vec![
            option(question_id, "Red", true),
            option(question_id, "Blue", false),
            option(question_id, "Green", false),
            option(question_id, "Yellow", false),
            option(question_id, "Pink", false),
            option(question_id, "Gold", false),
        ],
        sets: vec![],
    }
}

fn fixture_state() -> AppState {
    let mut config = Config::default();
    config.security.admin_passwords = vec![ADMIN_PASSWORD.to_string()];
    let config = Arc::new(config);

    let catalog = Arc::new(Catalog::from_document(fixture_document()));
    let metrics = Arc::new(Metrics::new());
    let tokens = Arc::new(TokenMint::new(config.security.token_ttl_hours));
    let registry = Arc::new(LobbyRegistry::new(
        Arc::clone(&catalog),
        Arc::clone(&metrics),
        config.server.clone(),
    ));

    AppState::new(catalog, registry, tokens, metrics, config)
}

/// Build the router against the fixture catalog without binding a socket,
/// for use with `axum_test::TestServer`.
pub fn fixture_router() -> axum::Router {
    build_router(fixture_state())
}

/// Bring up a full server instance bound to `127.0.0.1:0`, for tests that
/// need a real socket (websocket upgrades).
pub async fn spawn_app() -> SpawnedApp {
    let router = build_router(fixture_state());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    SpawnedApp {
        base_url: format!("http://{addr}"),
        ws_base_url: format!("ws://{addr}"),
    }
}

fn option(question_id: Uuid, text: &str, is_correct: bool) -> QuestionOption {
    QuestionOption {
        id: Uuid::new_v4(),
        question_id,
        text: text.to_string(),
        is_correct,
    }
}
