use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::learning::{self, Activity, Assessment, SkillLevel};

use super::app_state::AppState;
use super::collab_api::required;
use super::error::ApiError;

#[derive(Deserialize)]
pub struct AssessRequest {
    pub code: Option<String>,
    #[serde(default)]
    pub answers: Vec<Value>,
}

/// POST /api/learning/assess
pub async fn assess(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssessRequest>,
) -> Result<Json<Value>, ApiError> {
    let code = required(body.code, "Code sample is required")?;
    let assessment =
        learning::assess_coding_level(state.generator.as_ref(), &code, &body.answers).await?;
    Ok(Json(json!({ "success": true, "assessment": assessment })))
}

#[derive(Deserialize)]
pub struct GeneratePathRequest {
    pub assessment: Option<Assessment>,
    pub goal: Option<String>,
    pub language: Option<String>,
}

/// POST /api/learning/generate-path
pub async fn generate_path(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GeneratePathRequest>,
) -> Result<Json<Value>, ApiError> {
    let assessment = body
        .assessment
        .ok_or_else(|| ApiError::bad_request("Assessment is required"))?;
    let path = learning::generate_learning_path(
        state.generator.as_ref(),
        &assessment,
        body.goal.as_deref(),
        body.language.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "success": true, "learningPath": path })))
}

#[derive(Deserialize)]
pub struct ChallengeParams {
    pub level: Option<String>,
    pub language: Option<String>,
}

/// GET /api/learning/daily-challenge?level=&language=
pub async fn daily_challenge(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChallengeParams>,
) -> Result<Json<Value>, ApiError> {
    let level = params
        .level
        .as_deref()
        .map(SkillLevel::parse)
        .unwrap_or_default();
    let challenge =
        learning::daily_challenge(state.generator.as_ref(), level, params.language.as_deref())
            .await?;
    Ok(Json(json!({ "success": true, "challenge": challenge })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackProgressRequest {
    pub user_id: Option<String>,
    pub activity: Option<Activity>,
}

/// POST /api/learning/track-progress
pub async fn track_progress(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TrackProgressRequest>,
) -> Result<Json<Value>, ApiError> {
    const MSG: &str = "User ID and activity are required";
    let user_id = required(body.user_id, MSG)?;
    let activity = body.activity.ok_or_else(|| ApiError::bad_request(MSG))?;

    let update = state.progress.track(&user_id, activity);
    Ok(Json(json!({
        "success": true,
        "progress": update.progress,
        "nextRecommendation": update.next_recommendation,
    })))
}

/// GET /api/learning/stats/{user_id}
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Value> {
    Json(json!({ "success": true, "stats": state.progress.stats(&user_id) }))
}
