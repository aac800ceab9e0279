//! Database models for scheduled sessions.

use crate::types::{CommunityServiceId, LocalId, ProfessionalId, SessionId};
use bon::Builder;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

/// Session lifecycle state, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
    Rescheduled,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Scheduled => "SCHEDULED",
            SessionState::Ongoing => "ONGOING",
            SessionState::Completed => "COMPLETED",
            SessionState::Cancelled => "CANCELLED",
            SessionState::Rescheduled => "RESCHEDULED",
        }
    }
}

/// Database request for creating a new session.
///
/// New sessions always start `SCHEDULED` with no registrations.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct SessionCreateDBRequest {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub session_link: Option<String>,
    pub professional_id: ProfessionalId,
    pub local_id: Option<LocalId>,
    pub community_service_id: Option<CommunityServiceId>,
}

/// Database request for updating a session.
///
/// For the nullable references: None = no change, Some(None) = clear, Some(id) = set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdateDBRequest {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub state: Option<SessionState>,
    pub registered_count: Option<i32>,
    pub capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub session_link: Option<Option<String>>,
    pub professional_id: Option<ProfessionalId>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub local_id: Option<Option<LocalId>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub community_service_id: Option<Option<CommunityServiceId>>,
}

/// Filter for listing sessions. Empty lists place no constraint on that dimension.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub professional_ids: Vec<ProfessionalId>,
    pub local_ids: Vec<LocalId>,
    pub states: Vec<SessionState>,
}

/// Time window checked for overlapping sessions
#[derive(Debug, Clone)]
pub struct SessionTimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub professional_id: ProfessionalId,
    pub local_id: Option<LocalId>,
    /// Session to ignore, when re-checking a session being rescheduled
    pub exclude_session_id: Option<SessionId>,
}

/// Live, non-cancelled sessions overlapping a [`SessionTimeSlot`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConflicts {
    /// Sessions run by the same professional
    pub professional_conflicts: Vec<SessionDBResponse>,
    /// Sessions held in the same local
    pub local_conflicts: Vec<SessionDBResponse>,
}

impl SessionConflicts {
    pub fn has_conflict(&self) -> bool {
        !self.professional_conflicts.is_empty() || !self.local_conflicts.is_empty()
    }
}

/// Database response for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionDBResponse {
    pub id: SessionId,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub state: SessionState,
    pub registered_count: i32,
    pub capacity: i32,
    pub session_link: Option<String>,
    pub professional_id: ProfessionalId,
    pub local_id: Option<LocalId>,
    pub community_service_id: Option<CommunityServiceId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
