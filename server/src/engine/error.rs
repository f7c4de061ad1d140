use thiserror::Error;

/// Why a registry operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollabError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("session {0} is no longer active")]
    SessionInactive(String),

    #[error("session {session_id} is full (max {max} participants)")]
    SessionFull { session_id: String, max: usize },

    #[error("user {user_id} is not in session {session_id}")]
    NotAParticipant { session_id: String, user_id: String },

    #[error("only the host can edit session {session_id}")]
    EditForbidden { session_id: String, user_id: String },

    #[error("suggestion not found: {0}")]
    SuggestionNotFound(String),
}

impl CollabError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CollabError::InvalidArgument(_) => "invalid_argument",
            CollabError::NotFound(_) => "not_found",
            CollabError::SessionInactive(_) => "session_inactive",
            CollabError::SessionFull { .. } => "session_full",
            CollabError::NotAParticipant { .. } => "not_a_participant",
            CollabError::EditForbidden { .. } => "edit_forbidden",
            CollabError::SuggestionNotFound(_) => "suggestion_not_found",
        }
    }
}
