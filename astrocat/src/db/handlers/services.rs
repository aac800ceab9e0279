//! Database repository for services.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::services::{ServiceCreateDBRequest, ServiceDBResponse, ServiceUpdateDBRequest},
};
use crate::types::{ServiceId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing services. An empty id list returns every live service.
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub ids: Vec<ServiceId>,
}

pub struct Services<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Services<'c> {
    type CreateRequest = ServiceCreateDBRequest;
    type UpdateRequest = ServiceUpdateDBRequest;
    type Response = ServiceDBResponse;
    type Id = ServiceId;
    type Filter = ServiceFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let service = sqlx::query_as::<_, ServiceDBResponse>(
            r#"
            INSERT INTO services (id, name, description, image_url, is_virtual, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(request.is_virtual)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(service)
    }

    #[instrument(skip(self), fields(service_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let service = sqlx::query_as::<_, ServiceDBResponse>("SELECT * FROM services WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(service)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let services = sqlx::query_as::<_, ServiceDBResponse>("SELECT * FROM services WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(services.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(skip(self, filter), fields(ids = filter.ids.len()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM services WHERE deleted_at IS NULL");

        if !filter.ids.is_empty() {
            query.push(" AND id = ANY(");
            query.push_bind(&filter.ids);
            query.push(")");
        }

        query.push(" ORDER BY name, id");

        let services = query.build_query_as::<ServiceDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(services)
    }

    #[instrument(skip(self), fields(service_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE services SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(service_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let service = sqlx::query_as::<_, ServiceDBResponse>(
            r#"
            UPDATE services SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                is_virtual = COALESCE($5, is_virtual),
                updated_by = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.image_url)
        .bind(request.is_virtual)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(service)
    }
}

impl<'c> Services<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Soft-delete every live service in `ids`, returning how many were deleted
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_delete(&mut self, ids: &[ServiceId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result =
            sqlx::query("UPDATE services SET deleted_at = NOW(), updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(ids)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_services_by_ids(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Services::new(&mut conn);

        let yoga = repo
            .create(&ServiceCreateDBRequest::builder().name("Yoga").build(), "creator")
            .await
            .unwrap();
        let spinning = repo
            .create(&ServiceCreateDBRequest::builder().name("Spinning").is_virtual(true).build(), "creator")
            .await
            .unwrap();

        assert!(spinning.is_virtual);
        assert!(!yoga.is_virtual);

        let all = repo.list(&ServiceFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_yoga = repo.list(&ServiceFilter { ids: vec![yoga.id] }).await.unwrap();
        assert_eq!(only_yoga, vec![yoga.clone()]);

        // Deleted services drop out of filtered lists too
        assert!(repo.delete(yoga.id).await.unwrap());
        assert!(repo.list(&ServiceFilter { ids: vec![yoga.id] }).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_service(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Services::new(&mut conn);

        let service = repo
            .create(&ServiceCreateDBRequest::builder().name("Pilates").build(), "creator")
            .await
            .unwrap();

        let update = ServiceUpdateDBRequest {
            description: Some("Core strength".to_string()),
            is_virtual: Some(true),
            ..Default::default()
        };
        let updated = repo.update(service.id, &update, "editor").await.unwrap();
        assert_eq!(updated.name, "Pilates");
        assert_eq!(updated.description, "Core strength");
        assert!(updated.is_virtual);
    }
}
