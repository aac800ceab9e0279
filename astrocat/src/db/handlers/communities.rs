//! Database repository for communities.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::communities::{CommunityCreateDBRequest, CommunityDBResponse, CommunityUpdateDBRequest},
};
use crate::types::{CommunityId, abbrev_uuid};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Name of the partial unique index guarding live community names
pub const NAME_UNIQUE_CONSTRAINT: &str = "communities_name_unique";

pub struct Communities<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Communities<'c> {
    type CreateRequest = CommunityCreateDBRequest;
    type UpdateRequest = CommunityUpdateDBRequest;
    type Response = CommunityDBResponse;
    type Id = CommunityId;
    type Filter = ();

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        // number_subscriptions starts at the column default of 0
        let community = sqlx::query_as::<_, CommunityDBResponse>(
            r#"
            INSERT INTO communities (id, name, purpose, image_url, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.purpose)
        .bind(&request.image_url)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(community)
    }

    #[instrument(skip(self), fields(community_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let community = sqlx::query_as::<_, CommunityDBResponse>("SELECT * FROM communities WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(community)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let communities =
            sqlx::query_as::<_, CommunityDBResponse>("SELECT * FROM communities WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(&ids)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(communities.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let communities = sqlx::query_as::<_, CommunityDBResponse>("SELECT * FROM communities WHERE deleted_at IS NULL ORDER BY name")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(communities)
    }

    #[instrument(skip(self), fields(community_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result =
            sqlx::query("UPDATE communities SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(community_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let community = sqlx::query_as::<_, CommunityDBResponse>(
            r#"
            UPDATE communities SET
                name = COALESCE($2, name),
                purpose = COALESCE($3, purpose),
                image_url = COALESCE($4, image_url),
                number_subscriptions = COALESCE($5, number_subscriptions),
                updated_by = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.purpose)
        .bind(&request.image_url)
        .bind(request.number_subscriptions)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(community)
    }
}

impl<'c> Communities<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Soft-delete every live community in `ids`, returning how many were deleted
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_delete(&mut self, ids: &[CommunityId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result =
            sqlx::query("UPDATE communities SET deleted_at = NOW(), updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(ids)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected())
    }
}
