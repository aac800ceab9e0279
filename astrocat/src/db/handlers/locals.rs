//! Database repository for locals.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::locals::{LocalCreateDBRequest, LocalDBResponse, LocalUpdateDBRequest},
};
use crate::types::{LocalId, abbrev_uuid};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

pub struct Locals<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Locals<'c> {
    type CreateRequest = LocalCreateDBRequest;
    type UpdateRequest = LocalUpdateDBRequest;
    type Response = LocalDBResponse;
    type Id = LocalId;
    type Filter = ();

    #[instrument(skip(self, request), fields(local_name = %request.local_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let local = sqlx::query_as::<_, LocalDBResponse>(
            r#"
            INSERT INTO locals (
                id, local_name, street_name, building_number, district, province, region,
                reference, capacity, image_url, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.local_name)
        .bind(&request.street_name)
        .bind(&request.building_number)
        .bind(&request.district)
        .bind(&request.province)
        .bind(&request.region)
        .bind(&request.reference)
        .bind(request.capacity)
        .bind(&request.image_url)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(local)
    }

    #[instrument(skip(self), fields(local_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let local = sqlx::query_as::<_, LocalDBResponse>("SELECT * FROM locals WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(local)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let locals = sqlx::query_as::<_, LocalDBResponse>("SELECT * FROM locals WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(locals.into_iter().map(|l| (l.id, l)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let locals = sqlx::query_as::<_, LocalDBResponse>("SELECT * FROM locals WHERE deleted_at IS NULL ORDER BY local_name, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(locals)
    }

    #[instrument(skip(self), fields(local_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE locals SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(local_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let local = sqlx::query_as::<_, LocalDBResponse>(
            r#"
            UPDATE locals SET
                local_name = COALESCE($2, local_name),
                street_name = COALESCE($3, street_name),
                building_number = COALESCE($4, building_number),
                district = COALESCE($5, district),
                province = COALESCE($6, province),
                region = COALESCE($7, region),
                reference = COALESCE($8, reference),
                capacity = COALESCE($9, capacity),
                image_url = COALESCE($10, image_url),
                updated_by = $11,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.local_name)
        .bind(&request.street_name)
        .bind(&request.building_number)
        .bind(&request.district)
        .bind(&request.province)
        .bind(&request.region)
        .bind(&request.reference)
        .bind(request.capacity)
        .bind(&request.image_url)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(local)
    }
}

impl<'c> Locals<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Soft-delete every live local in `ids`, returning how many were deleted
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_delete(&mut self, ids: &[LocalId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result =
            sqlx::query("UPDATE locals SET deleted_at = NOW(), updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(ids)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected())
    }
}
