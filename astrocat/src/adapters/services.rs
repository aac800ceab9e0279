//! Service adapter.

use crate::adapters::{
    creation_error, internal_error, update_error,
    validation::{parse_ids, require_name, require_updated_by},
};
use crate::db::{
    handlers::{Repository, Services, services::ServiceFilter},
    models::services::{ServiceCreateDBRequest, ServiceDBResponse, ServiceUpdateDBRequest},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, ServiceId, abbrev_uuid};
use tracing::instrument;

#[derive(Clone)]
pub struct ServiceAdapter {
    db: DbPools,
}

impl ServiceAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(service_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: ServiceId) -> Result<ServiceDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Services::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: Entity::Service })
    }

    /// Live services with the given ids, or every live service when `ids` is empty
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn fetch(&self, ids: &[ServiceId]) -> Result<Vec<ServiceDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Services::new(&mut conn)
            .list(&ServiceFilter { ids: ids.to_vec() })
            .await
            .map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: &ServiceCreateDBRequest, updated_by: &str) -> Result<ServiceDBResponse> {
        require_updated_by(updated_by)?;
        require_name(Entity::Service, &request.name)?;

        let mut conn = self.db.write().acquire().await?;
        Services::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Service, e))
    }

    #[instrument(skip(self, request), fields(service_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: ServiceId, request: &ServiceUpdateDBRequest, updated_by: &str) -> Result<ServiceDBResponse> {
        require_updated_by(updated_by)?;
        if let Some(name) = &request.name {
            require_name(Entity::Service, name)?;
        }

        let mut conn = self.db.write().acquire().await?;
        Services::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Service, e))
    }

    #[instrument(skip(self), fields(service_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: ServiceId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Services::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound { entity: Entity::Service })
        }
    }

    /// Soft-delete the listed services; one malformed id rejects the whole batch
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<()> {
        let ids = parse_ids(Entity::Service, ids)?;
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.write().acquire().await?;
        Services::new(&mut conn).bulk_delete(&ids).await.map_err(internal_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_ACTOR, create_test_adapters};
    use sqlx::PgPool;

    fn service(name: &str) -> ServiceCreateDBRequest {
        ServiceCreateDBRequest::builder().name(name).description("Group class").build()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_requires_name(pool: PgPool) {
        let adapters = create_test_adapters(pool);

        let err = adapters.service.create(&service(""), TEST_ACTOR).await.unwrap_err();
        assert!(matches!(err, Error::InvalidName { entity: Entity::Service }));
        assert_eq!(err.code(), "BAD_REQUEST_ERROR_005");

        let err = adapters.service.create(&service("Yoga"), "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUpdatedByValue));

        assert!(adapters.service.fetch(&[]).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fetch_filters_by_id(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        let yoga = adapters.service.create(&service("Yoga"), TEST_ACTOR).await.unwrap();
        let pilates = adapters.service.create(&service("Pilates"), TEST_ACTOR).await.unwrap();

        assert_eq!(adapters.service.get(yoga.id).await.unwrap(), yoga);

        let all = adapters.service.fetch(&[]).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_pilates = adapters.service.fetch(&[pilates.id]).await.unwrap();
        assert_eq!(only_pilates, vec![pilates]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_delete_and_bulk_delete(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        let yoga = adapters.service.create(&service("Yoga"), TEST_ACTOR).await.unwrap();
        let boxing = adapters.service.create(&service("Boxing"), TEST_ACTOR).await.unwrap();

        let update = ServiceUpdateDBRequest {
            is_virtual: Some(true),
            ..Default::default()
        };
        let updated = adapters.service.update(yoga.id, &update, "editor").await.unwrap();
        assert!(updated.is_virtual);
        assert_eq!(updated.name, "Yoga");

        let blank_name = ServiceUpdateDBRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            adapters.service.update(yoga.id, &blank_name, "editor").await,
            Err(Error::InvalidName { entity: Entity::Service })
        ));

        adapters.service.delete(yoga.id).await.unwrap();
        assert!(matches!(
            adapters.service.get(yoga.id).await,
            Err(Error::NotFound { entity: Entity::Service })
        ));

        assert!(matches!(
            adapters.service.bulk_delete(&["bogus".to_string()]).await,
            Err(Error::InvalidId { entity: Entity::Service })
        ));
        adapters.service.bulk_delete(&[boxing.id.to_string()]).await.unwrap();
        assert!(adapters.service.fetch(&[]).await.unwrap().is_empty());
    }
}
