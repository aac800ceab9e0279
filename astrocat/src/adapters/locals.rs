//! Local (venue) adapter.

use crate::adapters::{
    creation_error, internal_error, update_error,
    validation::{parse_ids, require_updated_by},
};
use crate::db::{
    handlers::{Locals, Repository},
    models::locals::{LocalCreateDBRequest, LocalDBResponse, LocalUpdateDBRequest},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, LocalId, abbrev_uuid};
use tracing::instrument;

#[derive(Clone)]
pub struct LocalAdapter {
    db: DbPools,
}

impl LocalAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(local_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: LocalId) -> Result<LocalDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Locals::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: Entity::Local })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<LocalDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Locals::new(&mut conn).list(&()).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(local_name = %request.local_name))]
    pub async fn create(&self, request: &LocalCreateDBRequest, updated_by: &str) -> Result<LocalDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Locals::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Local, e))
    }

    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn bulk_create(&self, requests: &[LocalCreateDBRequest], updated_by: &str) -> Result<Vec<LocalDBResponse>> {
        require_updated_by(updated_by)?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.write().begin().await?;
        let locals = Locals::new(&mut tx)
            .bulk_create(requests, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Local, e))?;
        tx.commit().await?;

        Ok(locals)
    }

    #[instrument(skip(self, request), fields(local_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: LocalId, request: &LocalUpdateDBRequest, updated_by: &str) -> Result<LocalDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Locals::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Local, e))
    }

    #[instrument(skip(self), fields(local_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: LocalId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Locals::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound { entity: Entity::Local })
        }
    }

    /// Soft-delete the listed locals. Ids are parsed first: one malformed id rejects the batch.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<()> {
        let ids = parse_ids(Entity::Local, ids)?;
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.write().acquire().await?;
        Locals::new(&mut conn).bulk_delete(&ids).await.map_err(internal_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_ACTOR, create_test_adapters, local_request};
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_get_update(pool: PgPool) {
        let adapters = create_test_adapters(pool);

        let created = adapters.local.create(&local_request("Sede Central"), TEST_ACTOR).await.unwrap();
        assert_eq!(adapters.local.get(created.id).await.unwrap(), created);

        let update = LocalUpdateDBRequest {
            capacity: Some(45),
            reference: Some("Next to the park".to_string()),
            ..Default::default()
        };
        let updated = adapters.local.update(created.id, &update, "editor").await.unwrap();
        assert_eq!(updated.capacity, 45);
        assert_eq!(updated.reference, "Next to the park");
        assert_eq!(updated.local_name, "Sede Central");

        let negative = LocalUpdateDBRequest {
            capacity: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            adapters.local.update(created.id, &negative, "editor").await,
            Err(Error::NotUpdated { entity: Entity::Local })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_actor_rejected(pool: PgPool) {
        let adapters = create_test_adapters(pool);

        assert!(matches!(
            adapters.local.create(&local_request("Sede Norte"), "").await,
            Err(Error::InvalidUpdatedByValue)
        ));
        assert!(matches!(
            adapters.local.bulk_create(&[local_request("Sede Sur")], "").await,
            Err(Error::InvalidUpdatedByValue)
        ));
        assert!(adapters.local.fetch().await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_delete_rejects_malformed_id(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        let locals = adapters
            .local
            .bulk_create(&[local_request("Sede A"), local_request("Sede B")], TEST_ACTOR)
            .await
            .unwrap();

        let ids = vec![locals[0].id.to_string(), "definitely-not-a-uuid".to_string()];
        let err = adapters.local.bulk_delete(&ids).await.unwrap_err();
        assert!(matches!(err, Error::InvalidId { entity: Entity::Local }));
        assert_eq!(err.code(), "LOCAL_ERROR_004");
        assert_eq!(adapters.local.fetch().await.unwrap().len(), 2);

        adapters.local.bulk_delete(&[]).await.unwrap();
        adapters
            .local
            .bulk_delete(&[locals[0].id.to_string(), locals[1].id.to_string()])
            .await
            .unwrap();
        assert!(adapters.local.fetch().await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_unknown(pool: PgPool) {
        let adapters = create_test_adapters(pool);
        assert!(matches!(
            adapters.local.delete(Uuid::new_v4()).await,
            Err(Error::NotFound { entity: Entity::Local })
        ));
        assert!(matches!(
            adapters.local.get(Uuid::new_v4()).await,
            Err(Error::NotFound { entity: Entity::Local })
        ));
    }
}
