//! Database models for memberships and their suspensions.

use crate::types::{CommunityId, MembershipId, MembershipSuspensionId, PlanId, UserId};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

/// Membership status, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Active,
    Expired,
    Cancelled,
    OnHold,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "ACTIVE",
            MembershipStatus::Expired => "EXPIRED",
            MembershipStatus::Cancelled => "CANCELLED",
            MembershipStatus::OnHold => "ON_HOLD",
        }
    }
}

/// Database request for creating a new membership
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct MembershipCreateDBRequest {
    #[builder(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[builder(default = MembershipStatus::Active)]
    pub status: MembershipStatus,
    pub reservations_used: Option<i32>,
    pub community_id: CommunityId,
    pub user_id: UserId,
    pub plan_id: PlanId,
}

/// Database request for updating a membership
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipUpdateDBRequest {
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<MembershipStatus>,
    /// None = no change, Some(None) = clear, Some(n) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub reservations_used: Option<Option<i32>>,
    pub plan_id: Option<PlanId>,
}

/// Filter for listing memberships. Unset fields place no constraint.
#[derive(Debug, Clone, Default)]
pub struct MembershipFilter {
    pub user_id: Option<UserId>,
    pub community_id: Option<CommunityId>,
    pub statuses: Vec<MembershipStatus>,
}

impl MembershipFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn for_community(community_id: CommunityId) -> Self {
        Self {
            community_id: Some(community_id),
            ..Default::default()
        }
    }
}

/// Database response for a membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MembershipDBResponse {
    pub id: MembershipId,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: MembershipStatus,
    pub reservations_used: Option<i32>,
    pub community_id: CommunityId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Database response for a membership suspension.
///
/// A suspension is open while `resumed_at` is None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MembershipSuspensionDBResponse {
    pub id: MembershipSuspensionId,
    pub membership_id: MembershipId,
    pub suspended_at: DateTime<Utc>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl MembershipSuspensionDBResponse {
    pub fn is_open(&self) -> bool {
        self.resumed_at.is_none()
    }
}
