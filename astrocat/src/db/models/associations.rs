//! Database models for many-to-many associations.
//!
//! The four association tables share one shape: a surrogate id, the two parent ids and the
//! write audit columns. The pair of parent ids is the natural key; rows are deleted physically.
//! [`Association`] describes where each kind lives so a single repository can serve all four.

use crate::types::{CommunityId, Entity, LocalId, PlanId, ProfessionalId, ServiceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// Natural key of an association: (left parent id, right parent id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationPair {
    pub left_id: Uuid,
    pub right_id: Uuid,
}

impl AssociationPair {
    pub fn new(left_id: Uuid, right_id: Uuid) -> Self {
        Self { left_id, right_id }
    }

    pub fn has_nil(&self) -> bool {
        self.left_id.is_nil() || self.right_id.is_nil()
    }
}

/// Table layout of an association kind
pub trait Association: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin + 'static {
    const ENTITY: Entity;
    const TABLE: &'static str;
    const LEFT_COLUMN: &'static str;
    const RIGHT_COLUMN: &'static str;

    fn pair(&self) -> AssociationPair;
}

macro_rules! association {
    (
        $(#[$doc:meta])*
        $name:ident, $entity:expr, $table:literal,
        $left:ident: $left_ty:ty, $right:ident: $right_ty:ty
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
        pub struct $name {
            pub id: Uuid,
            pub $left: $left_ty,
            pub $right: $right_ty,
            pub created_at: DateTime<Utc>,
            pub updated_at: DateTime<Utc>,
            pub updated_by: String,
        }

        impl Association for $name {
            const ENTITY: Entity = $entity;
            const TABLE: &'static str = $table;
            const LEFT_COLUMN: &'static str = stringify!($left);
            const RIGHT_COLUMN: &'static str = stringify!($right);

            fn pair(&self) -> AssociationPair {
                AssociationPair::new(self.$left, self.$right)
            }
        }
    };
}

association!(
    /// Plan offered by a community
    CommunityPlan, Entity::CommunityPlan, "community_plans",
    community_id: CommunityId, plan_id: PlanId
);

association!(
    /// Service offered by a community
    CommunityService, Entity::CommunityService, "community_services",
    community_id: CommunityId, service_id: ServiceId
);

association!(
    /// Local where a service is held
    ServiceLocal, Entity::ServiceLocal, "service_locals",
    service_id: ServiceId, local_id: LocalId
);

association!(
    /// Professional who delivers a service
    ServiceProfessional, Entity::ServiceProfessional, "service_professionals",
    service_id: ServiceId, professional_id: ProfessionalId
);
