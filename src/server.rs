//! Process-wide wiring: the shared [`AppState`] every handler closes over,
//! and the axum [`Router`](axum::Router) that ties the AdminAPI (§4.6) and
//! the ConnectionHub (§4.5) together.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::metrics::Metrics;
use crate::registry::LobbyRegistry;
use crate::tokens::TokenMint;

pub mod admin;
pub mod connection;

/// Shared, cloneable application state threaded through every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub registry: Arc<LobbyRegistry>,
    pub tokens: Arc<TokenMint>,
    pub metrics: Arc<Metrics>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        catalog: Arc<Catalog>,
        registry: Arc<LobbyRegistry>,
        tokens: Arc<TokenMint>,
        metrics: Arc<Metrics>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            catalog,
            registry,
            tokens,
            metrics,
            config,
        }
    }
}

/// Assemble the full HTTP + WebSocket router (§6): the AdminAPI under
/// `/api`, the duplex upgrade at `/ws`, and a plaintext metrics endpoint.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/list-sets", get(admin::list_sets))
        .route("/api/create-lobby", axum::routing::post(admin::create_lobby))
        .route("/api/join-lobby", axum::routing::post(admin::join_lobby))
        .route("/ws", get(connection::websocket_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.security.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if parsed.is_empty() {
        tracing::warn!("No valid CORS origins configured, using permissive CORS");
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn metrics_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> String {
    state.metrics.render()
}
