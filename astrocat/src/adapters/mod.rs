//! Entity adapters: the typed boundary callers use to read and write records.
//!
//! Each adapter owns a clone of the shared [`DbPools`] handle and, per call:
//!
//! 1. validates its input (an empty actor or a malformed id is rejected before any query runs),
//! 2. acquires a connection, or opens a transaction for writes touching several rows,
//! 3. delegates to the matching repository in [`crate::db::handlers`],
//! 4. maps [`DbError`] to the entity-specific [`Error`].
//!
//! Reads go through [`DbPools::read`] and writes through [`DbPools::write`], so a configured
//! replica takes the read traffic.
//!
//! # Example
//!
//! ```ignore
//! use astrocat::adapters::AdapterCollection;
//!
//! let adapters = AdapterCollection::new(pools);
//! let community = adapters.community.create(&request, "admin@example.com").await?;
//! assert_eq!(community.number_subscriptions, 0);
//! ```

pub mod associations;
pub mod audit_logs;
pub mod communities;
pub mod locals;
pub mod memberships;
pub mod onboardings;
pub mod plans;
pub mod professionals;
pub mod reservations;
pub mod services;
pub mod sessions;
pub mod users;
pub mod validation;

pub use associations::AssociationAdapter;
pub use audit_logs::AuditLogAdapter;
pub use communities::CommunityAdapter;
pub use locals::LocalAdapter;
pub use memberships::MembershipAdapter;
pub use onboardings::OnboardingAdapter;
pub use plans::PlanAdapter;
pub use professionals::ProfessionalAdapter;
pub use reservations::ReservationAdapter;
pub use services::ServiceAdapter;
pub use sessions::SessionAdapter;
pub use users::UserAdapter;

use crate::db::{
    errors::DbError,
    models::associations::{CommunityPlan, CommunityService, ServiceLocal, ServiceProfessional},
    pools::DbPools,
};
use crate::errors::Error;
use crate::types::Entity;
use tracing::error;

/// One adapter per entity, all sharing the same pools
#[derive(Clone)]
pub struct AdapterCollection {
    pools: DbPools,
    pub user: UserAdapter,
    pub community: CommunityAdapter,
    pub plan: PlanAdapter,
    pub local: LocalAdapter,
    pub service: ServiceAdapter,
    pub professional: ProfessionalAdapter,
    pub session: SessionAdapter,
    pub reservation: ReservationAdapter,
    pub membership: MembershipAdapter,
    pub onboarding: OnboardingAdapter,
    pub audit_log: AuditLogAdapter,
    pub community_plan: AssociationAdapter<CommunityPlan>,
    pub community_service: AssociationAdapter<CommunityService>,
    pub service_local: AssociationAdapter<ServiceLocal>,
    pub service_professional: AssociationAdapter<ServiceProfessional>,
}

impl AdapterCollection {
    pub fn new(pools: DbPools) -> Self {
        Self {
            user: UserAdapter::new(pools.clone()),
            community: CommunityAdapter::new(pools.clone()),
            plan: PlanAdapter::new(pools.clone()),
            local: LocalAdapter::new(pools.clone()),
            service: ServiceAdapter::new(pools.clone()),
            professional: ProfessionalAdapter::new(pools.clone()),
            session: SessionAdapter::new(pools.clone()),
            reservation: ReservationAdapter::new(pools.clone()),
            membership: MembershipAdapter::new(pools.clone()),
            onboarding: OnboardingAdapter::new(pools.clone()),
            audit_log: AuditLogAdapter::new(pools.clone()),
            community_plan: AssociationAdapter::new(pools.clone()),
            community_service: AssociationAdapter::new(pools.clone()),
            service_local: AssociationAdapter::new(pools.clone()),
            service_professional: AssociationAdapter::new(pools.clone()),
            pools,
        }
    }

    pub fn pools(&self) -> &DbPools {
        &self.pools
    }
}

/// Map a failed insert to the error callers see.
///
/// Constraint violations mean the write was rejected by the schema and become
/// `NotCreated`; anything else is an internal failure.
pub(crate) fn creation_error(entity: Entity, err: DbError) -> Error {
    match err {
        DbError::UniqueViolation { .. } if entity.is_association() => Error::AlreadyExists { entity },
        e if e.is_constraint_violation() => Error::NotCreated { entity },
        other => internal_error(other),
    }
}

/// Map a failed update: a missing row is `NotFound`, a rejected value is `NotUpdated`
pub(crate) fn update_error(entity: Entity, err: DbError) -> Error {
    match err {
        DbError::NotFound => Error::NotFound { entity },
        e if e.is_constraint_violation() => Error::NotUpdated { entity },
        other => internal_error(other),
    }
}

pub(crate) fn internal_error(err: DbError) -> Error {
    error!("Unexpected database error: {:#}", err);
    Error::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique(constraint: &str) -> DbError {
        DbError::UniqueViolation {
            constraint: Some(constraint.to_string()),
            table: None,
            message: "duplicate key value violates unique constraint".to_string(),
        }
    }

    #[test]
    fn test_creation_error_mapping() {
        assert!(matches!(
            creation_error(Entity::CommunityPlan, unique("community_plans_pair_unique")),
            Error::AlreadyExists {
                entity: Entity::CommunityPlan
            }
        ));
        assert!(matches!(
            creation_error(Entity::Plan, unique("plans_pkey")),
            Error::NotCreated { entity: Entity::Plan }
        ));
        assert!(matches!(
            creation_error(Entity::Plan, DbError::Other(anyhow::anyhow!("connection reset"))),
            Error::Database(_)
        ));
    }

    #[test]
    fn test_update_error_mapping() {
        assert!(matches!(
            update_error(Entity::Session, DbError::NotFound),
            Error::NotFound {
                entity: Entity::Session
            }
        ));
        assert!(matches!(
            update_error(
                Entity::Local,
                DbError::CheckViolation {
                    constraint: Some("locals_capacity_check".to_string()),
                    table: None,
                    message: String::new(),
                }
            ),
            Error::NotUpdated { entity: Entity::Local }
        ));
    }
}
