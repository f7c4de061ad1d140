use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::ai::{GenerationParams, suggestion_prompt};
use crate::engine::error::CollabError;
use crate::engine::session::SessionOptions;

use super::app_state::AppState;
use super::error::ApiError;

type ApiResult = Result<Json<Value>, ApiError>;

/// Unwrap a required body field, rejecting missing or blank values.
pub(super) fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(message)),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub host_id: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub max_participants: Option<usize>,
    pub allow_editing: Option<bool>,
    pub ai_assistance: Option<bool>,
}

/// POST /api/collaboration/create
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionRequest>,
) -> ApiResult {
    let host_id = required(body.host_id, "Host ID is required")?;
    let options = SessionOptions {
        name: body.name,
        language: body.language,
        code: body.code,
        max_participants: body.max_participants,
        allow_editing: body.allow_editing,
        ai_assistance: body.ai_assistance,
    };

    let created = state.registry.create_session(&host_id, options)?;
    Ok(Json(json!({
        "success": true,
        "sessionId": created.session_id,
        "joinUrl": created.join_url,
        "session": created.session,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

/// POST /api/collaboration/join
pub async fn join_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JoinRequest>,
) -> ApiResult {
    const MSG: &str = "Session ID, user ID, and user name are required";
    let session_id = required(body.session_id, MSG)?;
    let user_id = required(body.user_id, MSG)?;
    let user_name = required(body.user_name, MSG)?;

    let outcome = state
        .registry
        .join_session(&session_id, &user_id, &user_name)?;
    Ok(Json(json!({
        "success": true,
        "session": outcome.session,
        "participants": outcome.participants,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeRequest {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    /// May be empty to clear the buffer, but must be present.
    pub code: Option<String>,
}

/// PUT /api/collaboration/update-code
pub async fn update_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateCodeRequest>,
) -> ApiResult {
    const MSG: &str = "Session ID, user ID, and code are required";
    let session_id = required(body.session_id, MSG)?;
    let user_id = required(body.user_id, MSG)?;
    let code = body.code.ok_or_else(|| ApiError::bad_request(MSG))?;

    let update = state
        .registry
        .update_session_code(&session_id, &user_id, &code)?;
    Ok(Json(json!(update)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSuggestionRequest {
    pub session_id: Option<String>,
    pub suggestion: Option<String>,
}

/// POST /api/collaboration/ai-suggestion: record caller-supplied text.
pub async fn add_suggestion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddSuggestionRequest>,
) -> ApiResult {
    const MSG: &str = "Session ID and suggestion are required";
    let session_id = required(body.session_id, MSG)?;
    let text = required(body.suggestion, MSG)?;

    let suggestion = state.registry.add_ai_suggestion(&session_id, &text)?;
    Ok(Json(json!({ "success": true, "suggestion": suggestion })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSuggestionRequest {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    /// What the review should concentrate on, e.g. "performance".
    pub focus: Option<String>,
}

/// POST /api/collaboration/generate-suggestion: ask the text generator
/// to review the session's code and record its answer.
pub async fn generate_suggestion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateSuggestionRequest>,
) -> ApiResult {
    const MSG: &str = "Session ID and user ID are required";
    let session_id = required(body.session_id, MSG)?;
    let user_id = required(body.user_id, MSG)?;

    let session = state.registry.get_session(&session_id)?;
    if !session.settings.ai_assistance {
        return Err(ApiError::AiAssistanceDisabled(session_id));
    }
    if !session.participant_ids().contains(&user_id.as_str()) {
        return Err(CollabError::NotAParticipant {
            session_id,
            user_id,
        }
        .into());
    }

    let prompt = suggestion_prompt(&session.language, &session.code, body.focus.as_deref());
    let text = state
        .generator
        .generate(&prompt, &GenerationParams::with_temperature(0.3))
        .await?;

    // The session may have emptied out while the model was thinking.
    let suggestion = state.registry.add_ai_suggestion(&session_id, &text)?;
    info!(%session_id, %user_id, "generated ai suggestion");
    Ok(Json(json!({ "success": true, "suggestion": suggestion })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySuggestionRequest {
    pub session_id: Option<String>,
    pub suggestion_id: Option<String>,
}

/// POST /api/collaboration/suggestions/apply
pub async fn apply_suggestion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApplySuggestionRequest>,
) -> ApiResult {
    const MSG: &str = "Session ID and suggestion ID are required";
    let session_id = required(body.session_id, MSG)?;
    let suggestion_id = required(body.suggestion_id, MSG)?;

    let suggestion = state
        .registry
        .mark_suggestion_applied(&session_id, &suggestion_id)?;
    Ok(Json(json!({ "success": true, "suggestion": suggestion })))
}

/// GET /api/collaboration/session/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let session = state.registry.get_session(&session_id)?;
    Ok(Json(json!({ "success": true, "session": session })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// POST /api/collaboration/leave
pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LeaveRequest>,
) -> ApiResult {
    const MSG: &str = "Session ID and user ID are required";
    let session_id = required(body.session_id, MSG)?;
    let user_id = required(body.user_id, MSG)?;

    state.registry.leave_session(&session_id, &user_id);
    Ok(Json(json!({
        "success": true,
        "message": "Left session successfully",
    })))
}

/// GET /api/collaboration/active
pub async fn active_sessions(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "sessions": state.registry.active_sessions(),
    }))
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.registry.session_count(),
    }))
}
