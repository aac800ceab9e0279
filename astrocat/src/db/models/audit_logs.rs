//! Database models for the audit trail.

use crate::db::models::users::UserRole;
use crate::types::{AuditLogId, UserId};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 50;
/// Largest page a caller may request
pub const MAX_PAGE_SIZE: i64 = 200;
/// Longest trailing window, in days, for stats and retention (roughly a century)
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Start of a trailing window of `days` days ending at `now`.
///
/// `days` is clamped to `0..=MAX_WINDOW_DAYS`, so any caller value yields a timestamp
/// PostgreSQL can store.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days.clamp(0, MAX_WINDOW_DAYS))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(now)
}

/// What the actor did, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    // Admin actions
    Create,
    Update,
    Delete,
    BulkCreate,
    BulkDelete,
    // User actions
    Login,
    Logout,
    Register,
    Subscribe,
    Unsubscribe,
    CreateReservation,
    CancelReservation,
    UpdateProfile,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::BulkCreate => "BULK_CREATE",
            AuditAction::BulkDelete => "BULK_DELETE",
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Register => "REGISTER",
            AuditAction::Subscribe => "SUBSCRIBE",
            AuditAction::Unsubscribe => "UNSUBSCRIBE",
            AuditAction::CreateReservation => "CREATE_RESERVATION",
            AuditAction::CancelReservation => "CANCEL_RESERVATION",
            AuditAction::UpdateProfile => "UPDATE_PROFILE",
        }
    }
}

/// Kind of record an audit entry is about, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntityType {
    User,
    Community,
    Professional,
    Local,
    Plan,
    Service,
    Session,
    Reservation,
    Membership,
    Onboarding,
    CommunityPlan,
    CommunityService,
    ServiceLocal,
    ServiceProfessional,
}

impl AuditEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntityType::User => "USER",
            AuditEntityType::Community => "COMMUNITY",
            AuditEntityType::Professional => "PROFESSIONAL",
            AuditEntityType::Local => "LOCAL",
            AuditEntityType::Plan => "PLAN",
            AuditEntityType::Service => "SERVICE",
            AuditEntityType::Session => "SESSION",
            AuditEntityType::Reservation => "RESERVATION",
            AuditEntityType::Membership => "MEMBERSHIP",
            AuditEntityType::Onboarding => "ONBOARDING",
            AuditEntityType::CommunityPlan => "COMMUNITY_PLAN",
            AuditEntityType::CommunityService => "COMMUNITY_SERVICE",
            AuditEntityType::ServiceLocal => "SERVICE_LOCAL",
            AuditEntityType::ServiceProfessional => "SERVICE_PROFESSIONAL",
        }
    }
}

/// Who performed an audited action, and from where
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditContext {
    pub user_id: UserId,
    pub user_email: String,
    pub user_role: UserRole,
    pub ip_address: String,
    pub user_agent: Option<String>,
}

/// What happened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: Option<Uuid>,
    pub entity_name: Option<String>,
    /// Snapshot before the change (updates and deletes)
    pub old_values: Option<serde_json::Value>,
    /// Snapshot after the change (creates and updates)
    pub new_values: Option<serde_json::Value>,
    pub additional_info: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl AuditEvent {
    /// A successful event with no snapshots attached
    pub fn succeeded(action: AuditAction, entity_type: AuditEntityType) -> Self {
        Self {
            action,
            entity_type,
            entity_id: None,
            entity_name: None,
            old_values: None,
            new_values: None,
            additional_info: None,
            success: true,
            error_message: None,
        }
    }

    /// A failed event carrying the error message shown to the actor
    pub fn failed(action: AuditAction, entity_type: AuditEntityType, error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            ..Self::succeeded(action, entity_type)
        }
    }
}

/// Filter and pagination for listing audit entries.
///
/// Empty lists and unset fields place no constraint. `page` and `page_size` are normalised by
/// [`AuditLogFilter::normalized`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLogFilter {
    pub user_ids: Vec<UserId>,
    pub actions: Vec<AuditAction>,
    pub entity_types: Vec<AuditEntityType>,
    pub user_roles: Vec<UserRole>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub success: Option<bool>,
    pub page: i64,
    pub page_size: i64,
}

impl AuditLogFilter {
    /// Page defaults to 1; page size defaults to 50 and is capped at 200
    pub fn normalized(mut self) -> Self {
        if self.page <= 0 {
            self.page = 1;
        }
        if self.page_size <= 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.page_size = self.page_size.min(MAX_PAGE_SIZE);
        self
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Database response for an audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogDBResponse {
    pub id: AuditLogId,
    pub user_id: UserId,
    pub user_email: String,
    pub user_role: UserRole,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: Option<Uuid>,
    pub entity_name: Option<String>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub additional_info: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of audit entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogPage {
    pub audit_logs: Vec<AuditLogDBResponse>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl AuditLogPage {
    pub fn new(audit_logs: Vec<AuditLogDBResponse>, total_count: i64, filter: &AuditLogFilter) -> Self {
        let total_pages = (total_count + filter.page_size - 1) / filter.page_size;
        Self {
            audit_logs,
            total_count,
            page: filter.page,
            page_size: filter.page_size,
            total_pages,
        }
    }
}

/// Count of audit entries sharing one value of a grouping column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditCount {
    pub key: String,
    pub count: i64,
}

/// Aggregates over the audit trail for a trailing window of days
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: i64,
    pub success_count: i64,
    pub failure_count: i64,
    pub active_users: i64,
    pub actions: Vec<AuditCount>,
    pub user_roles: Vec<AuditCount>,
    pub entity_types: Vec<AuditCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization() {
        let filter = AuditLogFilter::default().normalized();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);

        let filter = AuditLogFilter {
            page: 3,
            page_size: 1000,
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.page_size, MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 400);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let filter = AuditLogFilter {
            page: i64::MAX,
            page_size: MAX_PAGE_SIZE,
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.page, i64::MAX);
        assert_eq!(filter.offset(), i64::MAX);
    }

    #[test]
    fn test_window_start_clamps_days() {
        let now = Utc::now();
        assert_eq!(window_start(now, 30), now - TimeDelta::days(30));
        assert_eq!(window_start(now, -5), now);
        assert_eq!(window_start(now, i64::MAX), now - TimeDelta::days(MAX_WINDOW_DAYS));
        assert_eq!(window_start(now, 100_000_000), window_start(now, MAX_WINDOW_DAYS));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let filter = AuditLogFilter {
            page: 1,
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(AuditLogPage::new(vec![], 0, &filter).total_pages, 0);
        assert_eq!(AuditLogPage::new(vec![], 10, &filter).total_pages, 1);
        assert_eq!(AuditLogPage::new(vec![], 11, &filter).total_pages, 2);
    }

    #[test]
    fn test_failed_event() {
        let event = AuditEvent::failed(AuditAction::Delete, AuditEntityType::Plan, "Plan not found");
        assert!(!event.success);
        assert_eq!(event.error_message.as_deref(), Some("Plan not found"));
        assert_eq!(event.action.as_str(), "DELETE");
    }
}
