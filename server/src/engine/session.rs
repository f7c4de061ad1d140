use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a collaboration session.
pub type SessionId = String;

/// Identifier of a user, as claimed by the caller.
pub type UserId = String;

pub const DEFAULT_SESSION_NAME: &str = "Untitled Session";
pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_MAX_PARTICIPANTS: usize = 10;

/// Options recognized by `create_session`. Every field is optional and
/// falls back to the documented default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub name: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub max_participants: Option<usize>,
    pub allow_editing: Option<bool>,
    pub ai_assistance: Option<bool>,
}

/// Per-session rules, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub max_participants: usize,
    pub allow_editing: bool,
    pub ai_assistance: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            allow_editing: true,
            ai_assistance: true,
        }
    }
}

/// A user's membership record within one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    pub session_id: SessionId,
    pub joined_at: DateTime<Utc>,
}

/// A piece of AI-generated text attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub applied: bool,
}

impl AiSuggestion {
    pub fn new(text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            timestamp: Utc::now(),
            applied: false,
        }
    }
}

/// In-memory state for a single collaboration session.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub host_id: UserId,
    pub name: String,
    pub language: String,
    pub code: String,
    /// Participant ids in join order. Never contains duplicates.
    pub participants: Vec<UserId>,
    /// Membership records keyed by user id. A roster entry without a record
    /// (the host before joining) resolves as missing.
    pub records: HashMap<UserId, Participant>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub settings: SessionSettings,
    pub last_updated_by: Option<UserId>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub ai_suggestions: Vec<AiSuggestion>,
    /// Registry-assigned creation sequence, used to list sessions in
    /// creation order.
    pub(crate) seq: u64,
}

impl Session {
    pub fn new(
        id: SessionId,
        host_id: UserId,
        name: String,
        language: String,
        code: String,
        settings: SessionSettings,
        seq: u64,
    ) -> Self {
        Self {
            id,
            participants: vec![host_id.clone()],
            host_id,
            name,
            language,
            code,
            records: HashMap::new(),
            created_at: Utc::now(),
            is_active: true,
            settings,
            last_updated_by: None,
            last_updated_at: None,
            ai_suggestions: Vec::new(),
            seq,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.settings.max_participants
    }

    /// Remove a user from the roster and drop their record.
    /// Returns true if they were on the roster.
    pub fn remove_participant(&mut self, user_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p != user_id);
        self.records.remove(user_id);
        self.participants.len() != before
    }
}
