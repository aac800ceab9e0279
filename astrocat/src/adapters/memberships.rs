//! Membership adapter, covering suspensions and the expiry sweep.

use crate::adapters::{creation_error, internal_error, update_error, validation::require_updated_by};
use crate::db::{
    handlers::{MembershipSuspensions, Memberships, Repository},
    models::memberships::{
        MembershipCreateDBRequest, MembershipDBResponse, MembershipFilter, MembershipSuspensionDBResponse, MembershipUpdateDBRequest,
    },
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{CommunityId, Entity, MembershipId, MembershipSuspensionId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct MembershipAdapter {
    db: DbPools,
}

impl MembershipAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: MembershipId) -> Result<MembershipDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Memberships::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Membership,
            })
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)))]
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Vec<MembershipDBResponse>> {
        self.fetch(&MembershipFilter::for_user(user_id)).await
    }

    #[instrument(skip(self), fields(community_id = %abbrev_uuid(&community_id)))]
    pub async fn get_by_community(&self, community_id: CommunityId) -> Result<Vec<MembershipDBResponse>> {
        self.fetch(&MembershipFilter::for_community(community_id)).await
    }

    /// The user's most recent membership in the community
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), community_id = %abbrev_uuid(&community_id)))]
    pub async fn get_by_user_and_community(&self, user_id: UserId, community_id: CommunityId) -> Result<MembershipDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Memberships::new(&mut conn)
            .get_by_user_and_community(user_id, community_id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Membership,
            })
    }

    #[instrument(skip(self, filter))]
    pub async fn fetch(&self, filter: &MembershipFilter) -> Result<Vec<MembershipDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Memberships::new(&mut conn).list(filter).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)))]
    pub async fn create(&self, request: &MembershipCreateDBRequest, updated_by: &str) -> Result<MembershipDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Memberships::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Membership, e))
    }

    #[instrument(skip(self, request), fields(membership_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: MembershipId, request: &MembershipUpdateDBRequest, updated_by: &str) -> Result<MembershipDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Memberships::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Membership, e))
    }

    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: MembershipId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Memberships::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                entity: Entity::Membership,
            })
        }
    }

    /// Expire every active membership whose end date is before `now`, returning how many changed
    #[instrument(skip(self))]
    pub async fn expire_overdue(&self, now: DateTime<Utc>, updated_by: &str) -> Result<u64> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        let expired = Memberships::new(&mut conn)
            .expire_overdue(now, updated_by)
            .await
            .map_err(|e| update_error(Entity::Membership, e))?;

        info!("Expired {} overdue memberships", expired);
        Ok(expired)
    }

    /// Open a suspension on the membership, starting now
    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&membership_id)))]
    pub async fn suspend(&self, membership_id: MembershipId, updated_by: &str) -> Result<MembershipSuspensionDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        MembershipSuspensions::new(&mut conn)
            .create(membership_id, updated_by)
            .await
            .map_err(|e| creation_error(Entity::MembershipSuspension, e))
    }

    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&membership_id)))]
    pub async fn get_latest_open_suspension(&self, membership_id: MembershipId) -> Result<MembershipSuspensionDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        MembershipSuspensions::new(&mut conn)
            .get_latest_open(membership_id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::MembershipSuspension,
            })
    }

    /// Close an open suspension. Resuming an already closed one is `NotFound`.
    #[instrument(skip(self), fields(suspension_id = %abbrev_uuid(&suspension_id)))]
    pub async fn resume(&self, suspension_id: MembershipSuspensionId, updated_by: &str) -> Result<MembershipSuspensionDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        MembershipSuspensions::new(&mut conn)
            .resume(suspension_id, updated_by)
            .await
            .map_err(|e| update_error(Entity::MembershipSuspension, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::memberships::MembershipStatus;
    use crate::test_utils::{
        TEST_ACTOR, create_test_adapters, create_test_community, create_test_membership, create_test_plan, create_test_user,
        membership_request,
    };
    use chrono::Duration;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_lookups(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let gym = create_test_community(&pool, "Gym").await;
        let pool_club = create_test_community(&pool, "Pool").await;
        let plan = create_test_plan(&pool).await;
        let adapters = create_test_adapters(pool);
        let now = Utc::now();

        let older = adapters
            .membership
            .create(
                &membership_request(user.id, gym.id, plan.id, now - Duration::days(60), now - Duration::days(30)),
                TEST_ACTOR,
            )
            .await
            .unwrap();
        let current = adapters
            .membership
            .create(&membership_request(user.id, gym.id, plan.id, now, now + Duration::days(30)), TEST_ACTOR)
            .await
            .unwrap();
        let swimming = adapters
            .membership
            .create(&membership_request(user.id, pool_club.id, plan.id, now, now + Duration::days(30)), TEST_ACTOR)
            .await
            .unwrap();

        assert_eq!(adapters.membership.get(current.id).await.unwrap(), current);
        assert_eq!(adapters.membership.get_by_user(user.id).await.unwrap().len(), 3);

        let in_gym: Vec<_> = adapters
            .membership
            .get_by_community(gym.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(in_gym.len(), 2);
        assert!(in_gym.contains(&older.id));
        assert!(in_gym.contains(&current.id));
        assert!(!in_gym.contains(&swimming.id));

        assert_eq!(
            adapters.membership.get_by_user_and_community(user.id, gym.id).await.unwrap(),
            current
        );
        assert!(matches!(
            adapters.membership.get_by_user_and_community(Uuid::new_v4(), gym.id).await,
            Err(Error::NotFound {
                entity: Entity::Membership
            })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_expire_overdue(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let community = create_test_community(&pool, "Runners").await;
        let plan = create_test_plan(&pool).await;
        let adapters = create_test_adapters(pool);
        let now = Utc::now();

        let lapsed = adapters
            .membership
            .create(
                &membership_request(user.id, community.id, plan.id, now - Duration::days(40), now - Duration::days(10)),
                TEST_ACTOR,
            )
            .await
            .unwrap();
        let running = adapters
            .membership
            .create(
                &membership_request(user.id, community.id, plan.id, now, now + Duration::days(20)),
                TEST_ACTOR,
            )
            .await
            .unwrap();

        assert!(matches!(
            adapters.membership.expire_overdue(now, "").await,
            Err(Error::InvalidUpdatedByValue)
        ));

        assert_eq!(adapters.membership.expire_overdue(now, "expirer").await.unwrap(), 1);
        let lapsed = adapters.membership.get(lapsed.id).await.unwrap();
        assert_eq!(lapsed.status, MembershipStatus::Expired);
        assert_eq!(lapsed.updated_by, "expirer");
        assert_eq!(adapters.membership.get(running.id).await.unwrap().status, MembershipStatus::Active);

        // A second sweep finds nothing left to do
        assert_eq!(adapters.membership.expire_overdue(now, "expirer").await.unwrap(), 0);

        let filter = MembershipFilter {
            statuses: vec![MembershipStatus::Expired],
            ..Default::default()
        };
        assert_eq!(adapters.membership.fetch(&filter).await.unwrap(), vec![lapsed]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete(pool: PgPool) {
        let membership = create_test_membership(&pool).await;
        let adapters = create_test_adapters(pool);

        let update = MembershipUpdateDBRequest {
            status: Some(MembershipStatus::OnHold),
            reservations_used: Some(Some(3)),
            ..Default::default()
        };
        let updated = adapters.membership.update(membership.id, &update, "editor").await.unwrap();
        assert_eq!(updated.status, MembershipStatus::OnHold);
        assert_eq!(updated.reservations_used, Some(3));
        assert_eq!(updated.plan_id, membership.plan_id);

        adapters.membership.delete(membership.id).await.unwrap();
        assert!(matches!(
            adapters.membership.get(membership.id).await,
            Err(Error::NotFound {
                entity: Entity::Membership
            })
        ));
        assert!(matches!(
            adapters.membership.update(membership.id, &update, "editor").await,
            Err(Error::NotFound {
                entity: Entity::Membership
            })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_suspend_and_resume(pool: PgPool) {
        let membership = create_test_membership(&pool).await;
        let adapters = create_test_adapters(pool);

        assert!(matches!(
            adapters.membership.get_latest_open_suspension(membership.id).await,
            Err(Error::NotFound {
                entity: Entity::MembershipSuspension
            })
        ));

        let suspension = adapters.membership.suspend(membership.id, TEST_ACTOR).await.unwrap();
        assert!(suspension.is_open());
        assert_eq!(
            adapters.membership.get_latest_open_suspension(membership.id).await.unwrap(),
            suspension
        );

        let resumed = adapters.membership.resume(suspension.id, TEST_ACTOR).await.unwrap();
        assert!(resumed.resumed_at.is_some());
        assert!(!resumed.is_open());

        assert!(matches!(
            adapters.membership.resume(suspension.id, TEST_ACTOR).await,
            Err(Error::NotFound {
                entity: Entity::MembershipSuspension
            })
        ));
        assert!(matches!(
            adapters.membership.suspend(Uuid::new_v4(), TEST_ACTOR).await,
            Err(Error::NotCreated {
                entity: Entity::MembershipSuspension
            })
        ));
    }
}
