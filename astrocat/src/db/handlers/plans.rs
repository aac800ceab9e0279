//! Database repository for plans.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::plans::{PlanCreateDBRequest, PlanDBResponse, PlanUpdateDBRequest},
};
use crate::types::{PlanId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing plans. An empty id list returns every live plan.
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    pub ids: Vec<PlanId>,
}

impl PlanFilter {
    pub fn new(ids: Vec<PlanId>) -> Self {
        Self { ids }
    }
}

pub struct Plans<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Plans<'c> {
    type CreateRequest = PlanCreateDBRequest;
    type UpdateRequest = PlanUpdateDBRequest;
    type Response = PlanDBResponse;
    type Id = PlanId;
    type Filter = PlanFilter;

    #[instrument(skip(self, request), fields(plan_type = ?request.plan_type), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let plan = sqlx::query_as::<_, PlanDBResponse>(
            r#"
            INSERT INTO plans (id, fee, type, reservation_limit, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.fee)
        .bind(request.plan_type)
        .bind(request.reservation_limit)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(plan)
    }

    #[instrument(skip(self), fields(plan_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let plan = sqlx::query_as::<_, PlanDBResponse>("SELECT * FROM plans WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(plan)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let plans = sqlx::query_as::<_, PlanDBResponse>("SELECT * FROM plans WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(plans.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(ids = filter.ids.len()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM plans WHERE deleted_at IS NULL");

        if !filter.ids.is_empty() {
            query.push(" AND id = ANY(");
            query.push_bind(&filter.ids);
            query.push(")");
        }

        query.push(" ORDER BY created_at, id");

        let plans = query.build_query_as::<PlanDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(plans)
    }

    #[instrument(skip(self), fields(plan_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE plans SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(plan_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let plan = sqlx::query_as::<_, PlanDBResponse>(
            r#"
            UPDATE plans SET
                fee = COALESCE($2, fee),
                type = COALESCE($3, type),
                reservation_limit = CASE WHEN $4 THEN $5 ELSE reservation_limit END,
                updated_by = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.fee)
        .bind(request.plan_type)
        .bind(request.reservation_limit.is_some())
        .bind(request.reservation_limit.flatten())
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(plan)
    }
}

impl<'c> Plans<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Soft-delete every live plan in `ids`, returning how many were deleted
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_delete(&mut self, ids: &[PlanId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result =
            sqlx::query("UPDATE plans SET deleted_at = NOW(), updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(ids)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected())
    }
}
