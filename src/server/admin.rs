//! AdminAPI (C6, §4.6, §6): stateless, password-gated request/response
//! operations for catalog listing and lobby creation, plus the public
//! (unauthenticated) join endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::catalog::types::{QuestionSetId, QuestionSetSummary};
use crate::error::ErrorCode;
use crate::protocol::{validate_join_code, validate_name};
use crate::tokens::Role;

use super::AppState;

/// A uniform error body for every AdminAPI failure (§7): the same
/// `{code, message}` shape the websocket `Error` frame carries.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

struct ApiError(ErrorCode, StatusCode);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.0,
            message: self.0.description().to_string(),
        };
        (self.1, Json(body)).into_response()
    }
}

fn unauthorized() -> ApiError {
    ApiError(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)
}

#[derive(Debug, Serialize)]
pub struct ListSetsResponse {
    pub sets: Vec<QuestionSetSummary>,
}

pub async fn list_sets(State(state): State<AppState>) -> Json<ListSetsResponse> {
    Json(ListSetsResponse {
        sets: state.catalog.list_sets(),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateLobbyRequest {
    pub admin_password: String,
    #[serde(default)]
    pub set_id: Option<QuestionSetId>,
    pub host_name: String,
    #[serde(default)]
    pub round_duration_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CreateLobbyResponse {
    pub lobby_id: uuid::Uuid,
    pub join_code: String,
    pub host_token: String,
}

/// Constant-time membership check against the configured admin passwords
/// (§4.6): every candidate is compared so the response time doesn't leak
/// which configured password, if any, came close to matching.
fn admin_password_is_valid(configured: &[String], candidate: &str) -> bool {
    let mut matched = false;
    for password in configured {
        if constant_time_eq(password.as_bytes(), candidate.as_bytes()) {
            matched = true;
        }
    }
    matched
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

pub async fn create_lobby(
    State(state): State<AppState>,
    Json(req): Json<CreateLobbyRequest>,
) -> Result<Json<CreateLobbyResponse>, ApiError> {
    if !admin_password_is_valid(&state.config.security.admin_passwords, &req.admin_password) {
        return Err(unauthorized());
    }

    let host_name = validate_name(&req.host_name)
        .map_err(|code| ApiError(code, StatusCode::UNPROCESSABLE_ENTITY))?;

    if let Some(set_id) = req.set_id {
        if state.catalog.question_ids_for_set(Some(set_id)).is_err() {
            return Err(ApiError(ErrorCode::InvalidConfig, StatusCode::BAD_REQUEST));
        }
    }

    let (handle, host_id) =
        state
            .registry
            .create_lobby(host_name, req.set_id, req.round_duration_ms);
    let host_token = state
        .tokens
        .issue(handle.id, host_id, Role::Host)
        .await;

    Ok(Json(CreateLobbyResponse {
        lobby_id: handle.id,
        join_code: handle.join_code.clone(),
        host_token,
    }))
}

#[derive(Debug, Deserialize)]
pub struct JoinLobbyRequest {
    pub join_code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct JoinLobbyResponse {
    pub session_token: String,
    pub participant_id: uuid::Uuid,
    pub join_code: String,
}

pub async fn join_lobby(
    State(state): State<AppState>,
    Json(req): Json<JoinLobbyRequest>,
) -> Result<Json<JoinLobbyResponse>, ApiError> {
    validate_join_code(&req.join_code)
        .map_err(|code| ApiError(code, StatusCode::UNPROCESSABLE_ENTITY))?;
    let name = validate_name(&req.name)
        .map_err(|code| ApiError(code, StatusCode::UNPROCESSABLE_ENTITY))?;

    let handle = state
        .registry
        .resolve_by_join_code(&req.join_code)
        .map_err(|err| ApiError(err.code(), StatusCode::NOT_FOUND))?;

    let participant_id = handle
        .join(name)
        .await
        .map_err(|err| ApiError(err.code(), lobby_error_status(err.code())))?;

    let session_token = state
        .tokens
        .issue(handle.id, participant_id, Role::Player)
        .await;

    Ok(Json(JoinLobbyResponse {
        session_token,
        participant_id,
        join_code: handle.join_code.clone(),
    }))
}

fn lobby_error_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NameTaken => StatusCode::CONFLICT,
        ErrorCode::LobbyNotJoinable => StatusCode::FORBIDDEN,
        ErrorCode::LobbyClosed => StatusCode::GONE,
        _ => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_password_matches_any_configured_secret() {
        let passwords = vec!["first".to_string(), "second".to_string()];
        assert!(admin_password_is_valid(&passwords, "second"));
        assert!(!admin_password_is_valid(&passwords, "third"));
    }

    #[test]
    fn empty_configured_passwords_rejects_everything() {
        assert!(!admin_password_is_valid(&[], ""));
        assert!(!admin_password_is_valid(&[], "anything"));
    }
}
