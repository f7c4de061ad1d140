use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::CollabError;
use super::session::{
    AiSuggestion, DEFAULT_LANGUAGE, DEFAULT_MAX_PARTICIPANTS, DEFAULT_SESSION_NAME, Participant,
    Session, SessionId, SessionOptions, SessionSettings,
};
use super::validation;
use super::views::{
    CodeUpdate, CreatedSession, JoinOutcome, SessionSummary, SessionView, resolve_participants,
};

/// Default upper bound on a session's code buffer (bytes).
pub const DEFAULT_MAX_CODE_LENGTH: usize = 1_000_000;

/// Tunables for a `SessionRegistry`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL used to build join links.
    pub public_url: String,
    /// Capacity applied when `maxParticipants` is not supplied.
    pub default_max_participants: usize,
    pub max_code_length: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".into(),
            default_max_participants: DEFAULT_MAX_PARTICIPANTS,
            max_code_length: DEFAULT_MAX_CODE_LENGTH,
        }
    }
}

/// Authoritative in-memory state of every collaboration session.
///
/// Sessions live in a sharded map. Each mutation holds the session's entry
/// guard for its whole check-then-act sequence, and removal of an emptied
/// session goes through the same guard, so an empty session is never
/// observable by other callers.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Session>,
    next_seq: AtomicU64,
    config: RegistryConfig,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            next_seq: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Create a session hosted by `host_id`. The host is the first entry on
    /// the roster but has no participant record until they join.
    pub fn create_session(
        &self,
        host_id: &str,
        options: SessionOptions,
    ) -> Result<CreatedSession, CollabError> {
        validation::validate_user_id(host_id).map_err(CollabError::InvalidArgument)?;

        let name = options
            .name
            .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string());
        validation::validate_session_name(&name).map_err(CollabError::InvalidArgument)?;

        let language = options
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        validation::validate_language(&language).map_err(CollabError::InvalidArgument)?;

        let code = options.code.unwrap_or_default();
        validation::validate_code(&code, self.config.max_code_length)
            .map_err(CollabError::InvalidArgument)?;

        let max_participants = options
            .max_participants
            .unwrap_or(self.config.default_max_participants);
        validation::validate_max_participants(max_participants)
            .map_err(CollabError::InvalidArgument)?;

        let settings = SessionSettings {
            max_participants,
            allow_editing: options.allow_editing.unwrap_or(true),
            ai_assistance: options.ai_assistance.unwrap_or(true),
        };

        let session_id = Uuid::new_v4().to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let session = Session::new(
            session_id.clone(),
            host_id.to_string(),
            name,
            language,
            code,
            settings,
            seq,
        );
        let view = SessionView::from(&session);
        self.sessions.insert(session_id.clone(), session);

        info!(%session_id, %host_id, max_participants, "session created");

        Ok(CreatedSession {
            join_url: self.join_url(&session_id),
            session_id,
            session: view,
        })
    }

    /// Join a session. Rejoining is idempotent and never consumes a slot;
    /// the participant record is refreshed either way.
    pub fn join_session(
        &self,
        session_id: &str,
        user_id: &str,
        user_name: &str,
    ) -> Result<JoinOutcome, CollabError> {
        validation::validate_user_id(user_id).map_err(CollabError::InvalidArgument)?;
        validation::validate_user_name(user_name).map_err(CollabError::InvalidArgument)?;

        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CollabError::NotFound(session_id.to_string()))?;

        if !session.is_active {
            warn!(%session_id, %user_id, "join rejected: session inactive");
            return Err(CollabError::SessionInactive(session_id.to_string()));
        }

        if !session.is_participant(user_id) {
            if session.is_full() {
                warn!(%session_id, %user_id, "join rejected: session full");
                return Err(CollabError::SessionFull {
                    session_id: session_id.to_string(),
                    max: session.settings.max_participants,
                });
            }
            session.participants.push(user_id.to_string());
        }

        session.records.insert(
            user_id.to_string(),
            Participant {
                id: user_id.to_string(),
                name: user_name.to_string(),
                session_id: session_id.to_string(),
                joined_at: Utc::now(),
            },
        );

        info!(%session_id, %user_id, count = session.participant_count(), "joined session");

        Ok(JoinOutcome {
            participants: resolve_participants(&session),
            session: SessionView::from(&*session),
        })
    }

    /// Leave a session. Unknown sessions are a no-op. The host leaving
    /// closes the session to new joins; the last participant leaving
    /// removes it.
    pub fn leave_session(&self, session_id: &str, user_id: &str) {
        let Entry::Occupied(mut entry) = self.sessions.entry(session_id.to_string()) else {
            return;
        };

        let session = entry.get_mut();
        session.remove_participant(user_id);

        if session.is_host(user_id) && session.is_active {
            session.is_active = false;
            info!(%session_id, host_id = %user_id, "host left, session closed");
        }

        if session.participants.is_empty() {
            entry.remove();
            info!(%session_id, "session empty, removed");
        } else {
            info!(%session_id, %user_id, "left session");
        }
    }

    // ── Shared buffer ───────────────────────────────────────────────

    /// Replace the session's code. Last write wins.
    pub fn update_session_code(
        &self,
        session_id: &str,
        user_id: &str,
        code: &str,
    ) -> Result<CodeUpdate, CollabError> {
        validation::validate_code(code, self.config.max_code_length)
            .map_err(CollabError::InvalidArgument)?;

        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CollabError::NotFound(session_id.to_string()))?;

        if !session.is_participant(user_id) {
            return Err(CollabError::NotAParticipant {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        if !session.settings.allow_editing && !session.is_host(user_id) {
            return Err(CollabError::EditForbidden {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        session.code = code.to_string();
        session.last_updated_by = Some(user_id.to_string());
        session.last_updated_at = Some(Utc::now());

        Ok(CodeUpdate {
            success: true,
            code: session.code.clone(),
            updated_by: session.records.get(user_id).map(|p| p.name.clone()),
        })
    }

    // ── AI suggestions ──────────────────────────────────────────────

    /// Append a suggestion to the session's log. The text is stored verbatim.
    pub fn add_ai_suggestion(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<AiSuggestion, CollabError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CollabError::NotFound(session_id.to_string()))?;

        let suggestion = AiSuggestion::new(text.to_string());
        session.ai_suggestions.push(suggestion.clone());

        info!(%session_id, suggestion_id = %suggestion.id, "ai suggestion added");
        Ok(suggestion)
    }

    /// Flag a suggestion as applied. Marking twice is harmless.
    pub fn mark_suggestion_applied(
        &self,
        session_id: &str,
        suggestion_id: &str,
    ) -> Result<AiSuggestion, CollabError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CollabError::NotFound(session_id.to_string()))?;

        let suggestion = session
            .ai_suggestions
            .iter_mut()
            .find(|s| s.id == suggestion_id)
            .ok_or_else(|| CollabError::SuggestionNotFound(suggestion_id.to_string()))?;

        suggestion.applied = true;
        Ok(suggestion.clone())
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn get_session(&self, session_id: &str) -> Result<SessionView, CollabError> {
        self.sessions
            .get(session_id)
            .map(|s| SessionView::from(&*s))
            .ok_or_else(|| CollabError::NotFound(session_id.to_string()))
    }

    /// Summaries of every active session, in creation order.
    pub fn active_sessions(&self) -> Vec<SessionSummary> {
        let mut active: Vec<(u64, SessionSummary)> = self
            .sessions
            .iter()
            .filter(|s| s.is_active)
            .map(|s| (s.seq, SessionSummary::from(&*s)))
            .collect();
        active.sort_by_key(|(seq, _)| *seq);
        active.into_iter().map(|(_, summary)| summary).collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn join_url(&self, session_id: &str) -> String {
        format!(
            "{}/session/{}",
            self.config.public_url.trim_end_matches('/'),
            session_id
        )
    }
}
