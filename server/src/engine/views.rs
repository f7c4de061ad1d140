use chrono::{DateTime, Utc};
use serde::Serialize;

use super::session::{AiSuggestion, Participant, Session, SessionId, SessionSettings, UserId};

/// A roster entry resolved against the session's participant records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParticipantSlot {
    Present(Participant),
    /// On the roster but without a record (e.g. the host before joining).
    Missing { id: UserId, missing: bool },
}

impl ParticipantSlot {
    pub fn id(&self) -> &str {
        match self {
            ParticipantSlot::Present(p) => &p.id,
            ParticipantSlot::Missing { id, .. } => id,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ParticipantSlot::Missing { .. })
    }
}

/// Snapshot of a session with its roster resolved in join order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub host_id: UserId,
    pub name: String,
    pub language: String,
    pub code: String,
    pub participants: Vec<ParticipantSlot>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub settings: SessionSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
    pub ai_suggestions: Vec<AiSuggestion>,
}

impl SessionView {
    pub fn participant_ids(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.id()).collect()
    }
}

pub(crate) fn resolve_participants(session: &Session) -> Vec<ParticipantSlot> {
    session
        .participants
        .iter()
        .map(|id| match session.records.get(id) {
            Some(p) => ParticipantSlot::Present(p.clone()),
            None => ParticipantSlot::Missing {
                id: id.clone(),
                missing: true,
            },
        })
        .collect()
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            host_id: s.host_id.clone(),
            name: s.name.clone(),
            language: s.language.clone(),
            code: s.code.clone(),
            participants: resolve_participants(s),
            created_at: s.created_at,
            is_active: s.is_active,
            settings: s.settings,
            last_updated_by: s.last_updated_by.clone(),
            last_updated_at: s.last_updated_at,
            ai_suggestions: s.ai_suggestions.clone(),
        }
    }
}

/// Listing entry for an active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub name: String,
    pub language: String,
    pub participant_count: usize,
    pub max_participants: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            language: s.language.clone(),
            participant_count: s.participants.len(),
            max_participants: s.settings.max_participants,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: SessionId,
    pub join_url: String,
    pub session: SessionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub session: SessionView,
    pub participants: Vec<ParticipantSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeUpdate {
    pub success: bool,
    pub code: String,
    /// Display name of the editor, when they have a participant record.
    pub updated_by: Option<String>,
}
