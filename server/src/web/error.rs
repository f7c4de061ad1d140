use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::ai::AiError;
use crate::engine::error::CollabError;

/// Everything a handler can fail with, mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("AI assistance is disabled for session {0}")]
    AiAssistanceDisabled(String),

    #[error(transparent)]
    Collab(#[from] CollabError),

    #[error(transparent)]
    Ai(#[from] AiError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AiAssistanceDisabled(_) => StatusCode::FORBIDDEN,
            ApiError::Collab(e) => match e {
                CollabError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                CollabError::NotFound(_) | CollabError::SuggestionNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CollabError::NotAParticipant { .. } | CollabError::EditForbidden { .. } => {
                    StatusCode::FORBIDDEN
                }
                CollabError::SessionInactive(_) | CollabError::SessionFull { .. } => {
                    StatusCode::CONFLICT
                }
            },
            ApiError::Ai(AiError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Ai(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::AiAssistanceDisabled(_) => "ai_assistance_disabled",
            ApiError::Collab(e) => e.kind(),
            ApiError::Ai(AiError::NotConfigured) => "ai_not_configured",
            ApiError::Ai(_) => "ai_upstream_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Ai(e) = &self {
            error!(error = %e, "text generation failed");
        }
        let body = Json(json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(CollabError::InvalidArgument("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(CollabError::NotFound("s".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(CollabError::SessionFull {
                    session_id: "s".into(),
                    max: 2,
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(CollabError::EditForbidden {
                    session_id: "s".into(),
                    user_id: "u".into(),
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(AiError::NotConfigured),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::from(AiError::EmptyResponse), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_kind_passes_through_collab_kind() {
        let err = ApiError::from(CollabError::SessionInactive("s".into()));
        assert_eq!(err.kind(), "session_inactive");
        assert_eq!(err.to_string(), "session s is no longer active");
    }
}
