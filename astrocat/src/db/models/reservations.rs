//! Database models for session reservations.

use crate::types::{MembershipId, ReservationId, SessionId, UserId};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

/// Reservation state, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationState {
    Done,
    Confirmed,
    Cancelled,
    Anulled,
}

impl ReservationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Done => "DONE",
            ReservationState::Confirmed => "CONFIRMED",
            ReservationState::Cancelled => "CANCELLED",
            ReservationState::Anulled => "ANULLED",
        }
    }
}

/// Database request for creating a new reservation
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct ReservationCreateDBRequest {
    pub name: String,
    pub reservation_time: DateTime<Utc>,
    #[builder(default = ReservationState::Confirmed)]
    pub state: ReservationState,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub membership_id: Option<MembershipId>,
}

/// Database request for updating a reservation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationUpdateDBRequest {
    pub name: Option<String>,
    pub reservation_time: Option<DateTime<Utc>>,
    pub state: Option<ReservationState>,
    pub session_id: Option<SessionId>,
    /// None = no change, Some(None) = detach, Some(id) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub membership_id: Option<Option<MembershipId>>,
}

/// Filter for listing reservations.
///
/// Empty lists place no constraint on that dimension; the provided ones are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub user_ids: Vec<UserId>,
    pub session_ids: Vec<SessionId>,
    pub states: Vec<ReservationState>,
}

/// Database response for a reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReservationDBResponse {
    pub id: ReservationId,
    pub name: String,
    pub reservation_time: DateTime<Utc>,
    pub state: ReservationState,
    pub last_modification: DateTime<Utc>,
    pub user_id: UserId,
    pub session_id: SessionId,
    pub membership_id: Option<MembershipId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
