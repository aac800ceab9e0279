//! Plan adapter.

use crate::adapters::{creation_error, internal_error, update_error, validation::require_updated_by};
use crate::db::{
    handlers::{Plans, Repository, plans::PlanFilter},
    models::plans::{PlanCreateDBRequest, PlanDBResponse, PlanUpdateDBRequest},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, PlanId, abbrev_uuid};
use tracing::instrument;

#[derive(Clone)]
pub struct PlanAdapter {
    db: DbPools,
}

impl PlanAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(plan_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: PlanId) -> Result<PlanDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Plans::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: Entity::Plan })
    }

    /// Live plans with the given ids, or every live plan when `ids` is empty
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn fetch(&self, ids: &[PlanId]) -> Result<Vec<PlanDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Plans::new(&mut conn)
            .list(&PlanFilter::new(ids.to_vec()))
            .await
            .map_err(internal_error)
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: &PlanCreateDBRequest, updated_by: &str) -> Result<PlanDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Plans::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Plan, e))
    }

    /// Create every plan or none. An empty batch is rejected as `NotCreated`.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn bulk_create(&self, requests: &[PlanCreateDBRequest], updated_by: &str) -> Result<Vec<PlanDBResponse>> {
        require_updated_by(updated_by)?;
        if requests.is_empty() {
            return Err(Error::NotCreated { entity: Entity::Plan });
        }

        let mut tx = self.db.write().begin().await?;
        let plans = Plans::new(&mut tx)
            .bulk_create(requests, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Plan, e))?;
        tx.commit().await?;

        Ok(plans)
    }

    #[instrument(skip(self, request), fields(plan_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: PlanId, request: &PlanUpdateDBRequest, updated_by: &str) -> Result<PlanDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Plans::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Plan, e))
    }

    #[instrument(skip(self), fields(plan_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: PlanId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Plans::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound { entity: Entity::Plan })
        }
    }

    /// Soft-delete every listed plan; an empty list is a no-op
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[PlanId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.write().acquire().await?;
        Plans::new(&mut conn).bulk_delete(ids).await.map_err(internal_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::plans::PlanType;
    use crate::test_utils::{TEST_ACTOR, create_test_adapters};
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use uuid::Uuid;

    fn plan(fee: Decimal, plan_type: PlanType, limit: Option<i32>) -> PlanCreateDBRequest {
        PlanCreateDBRequest::builder()
            .fee(fee)
            .plan_type(plan_type)
            .maybe_reservation_limit(limit)
            .build()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_create_preserves_order(pool: PgPool) {
        let adapters = create_test_adapters(pool);

        let requests = vec![
            plan(Decimal::new(2999, 2), PlanType::Monthly, Some(8)),
            plan(Decimal::new(5999, 2), PlanType::Anual, None),
        ];
        let plans = adapters.plan.bulk_create(&requests, TEST_ACTOR).await.unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].fee, Decimal::new(2999, 2));
        assert_eq!(plans[1].fee, Decimal::new(5999, 2));
        assert_eq!(plans[0].reservation_limit, Some(8));
        assert_eq!(plans[1].reservation_limit, None);
        assert!(plans.iter().all(|p| p.updated_by == TEST_ACTOR));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_create_rejects_empty_batch(pool: PgPool) {
        let adapters = create_test_adapters(pool);

        let err = adapters.plan.bulk_create(&[], TEST_ACTOR).await.unwrap_err();
        assert!(matches!(err, Error::NotCreated { entity: Entity::Plan }));
        assert_eq!(err.code(), "PLAN_ERROR_002");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_actor_persists_nothing(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        let request = plan(Decimal::new(1000, 2), PlanType::Monthly, Some(4));

        let err = adapters.plan.create(&request, "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUpdatedByValue));

        let err = adapters.plan.bulk_create(&[request], "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUpdatedByValue));

        assert!(adapters.plan.fetch(&[]).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_update_delete(pool: PgPool) {
        let adapters = create_test_adapters(pool);

        let created = adapters
            .plan
            .create(&plan(Decimal::new(2999, 2), PlanType::Monthly, Some(8)), TEST_ACTOR)
            .await
            .unwrap();
        assert_eq!(adapters.plan.get(created.id).await.unwrap(), created);

        let update = PlanUpdateDBRequest {
            fee: Some(Decimal::new(3499, 2)),
            ..Default::default()
        };
        let updated = adapters.plan.update(created.id, &update, "editor").await.unwrap();
        assert_eq!(updated.fee, Decimal::new(3499, 2));
        assert_eq!(updated.reservation_limit, Some(8));
        assert_eq!(updated.updated_by, "editor");

        adapters.plan.delete(created.id).await.unwrap();
        assert!(matches!(
            adapters.plan.get(created.id).await,
            Err(Error::NotFound { entity: Entity::Plan })
        ));
        assert!(matches!(
            adapters.plan.delete(created.id).await,
            Err(Error::NotFound { entity: Entity::Plan })
        ));
        assert!(matches!(
            adapters.plan.update(created.id, &update, "editor").await,
            Err(Error::NotFound { entity: Entity::Plan })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_unknown_id(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        assert!(matches!(
            adapters.plan.get(Uuid::new_v4()).await,
            Err(Error::NotFound { entity: Entity::Plan })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fetch_and_bulk_delete(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        let requests = vec![
            plan(Decimal::new(1000, 2), PlanType::Monthly, Some(4)),
            plan(Decimal::new(2000, 2), PlanType::Monthly, Some(8)),
            plan(Decimal::new(9000, 2), PlanType::Anual, None),
        ];
        let plans = adapters.plan.bulk_create(&requests, TEST_ACTOR).await.unwrap();

        assert_eq!(adapters.plan.fetch(&[]).await.unwrap().len(), 3);

        let subset = adapters.plan.fetch(&[plans[0].id, plans[2].id]).await.unwrap();
        let ids: Vec<_> = subset.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&plans[0].id));
        assert!(ids.contains(&plans[2].id));

        adapters.plan.bulk_delete(&[]).await.unwrap();
        adapters.plan.bulk_delete(&[plans[0].id, plans[1].id]).await.unwrap();

        let remaining = adapters.plan.fetch(&[]).await.unwrap();
        assert_eq!(remaining, vec![plans[2].clone()]);
    }
}
