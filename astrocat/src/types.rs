//! Common type definitions.
//!
//! This module defines:
//! - Type aliases for entity IDs (UserId, CommunityId, etc.)
//! - The [`Entity`] enum naming every persisted entity kind
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases so signatures document which table an
//! identifier points into:
//!
//! - [`UserId`], [`CommunityId`], [`PlanId`], [`ServiceId`], [`LocalId`], [`ProfessionalId`]
//! - [`SessionId`], [`ReservationId`], [`MembershipId`], [`MembershipSuspensionId`]
//! - [`OnboardingId`], [`AuditLogId`], [`CommunityServiceId`]
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type CommunityId = Uuid;
pub type PlanId = Uuid;
pub type ServiceId = Uuid;
pub type LocalId = Uuid;
pub type ProfessionalId = Uuid;
pub type SessionId = Uuid;
pub type ReservationId = Uuid;
pub type MembershipId = Uuid;
pub type MembershipSuspensionId = Uuid;
pub type OnboardingId = Uuid;
pub type AuditLogId = Uuid;
pub type CommunityServiceId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Every kind of record the adapters manage.
///
/// Used to key typed errors (`NotFound { entity: Entity::Plan }`) and to derive their stable
/// error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    User,
    Community,
    Plan,
    Local,
    Service,
    Professional,
    Session,
    Reservation,
    Membership,
    MembershipSuspension,
    Onboarding,
    AuditLog,
    CommunityPlan,
    CommunityService,
    ServiceLocal,
    ServiceProfessional,
}

impl Entity {
    /// Prefix used for `<PREFIX>_ERROR_<NNN>` codes
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Entity::User => "USER",
            Entity::Community => "COMMUNITY",
            Entity::Plan => "PLAN",
            Entity::Local => "LOCAL",
            Entity::Service => "SERVICE",
            Entity::Professional => "PROFESSIONAL",
            Entity::Session => "SESSION",
            Entity::Reservation => "RESERVATION",
            Entity::Membership => "MEMBERSHIP",
            Entity::MembershipSuspension => "MEMBERSHIP_SUSPENSION",
            Entity::Onboarding => "ONBOARDING",
            Entity::AuditLog => "AUDIT_LOG",
            Entity::CommunityPlan => "COMMUNITY_PLAN",
            Entity::CommunityService => "COMMUNITY_SERVICE",
            Entity::ServiceLocal => "SERVICE_LOCAL",
            Entity::ServiceProfessional => "SERVICE_PROFESSIONAL",
        }
    }

    pub fn is_association(&self) -> bool {
        matches!(
            self,
            Entity::CommunityPlan | Entity::CommunityService | Entity::ServiceLocal | Entity::ServiceProfessional
        )
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Community => "Community",
            Entity::Plan => "Plan",
            Entity::Local => "Local",
            Entity::Service => "Service",
            Entity::Professional => "Professional",
            Entity::Session => "Session",
            Entity::Reservation => "Reservation",
            Entity::Membership => "Membership",
            Entity::MembershipSuspension => "Membership suspension",
            Entity::Onboarding => "Onboarding",
            Entity::AuditLog => "Audit log",
            Entity::CommunityPlan => "Community-Plan association",
            Entity::CommunityService => "Community-Service association",
            Entity::ServiceLocal => "Service-Local association",
            Entity::ServiceProfessional => "Service-Professional association",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }

    #[test]
    fn test_entity_code_prefix() {
        assert_eq!(Entity::CommunityPlan.code_prefix(), "COMMUNITY_PLAN");
        assert_eq!(Entity::MembershipSuspension.code_prefix(), "MEMBERSHIP_SUSPENSION");
        assert!(Entity::ServiceLocal.is_association());
        assert!(!Entity::Plan.is_association());
    }
}
