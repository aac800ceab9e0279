//! Database repository for memberships.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::memberships::{
        MembershipCreateDBRequest, MembershipDBResponse, MembershipFilter, MembershipStatus, MembershipUpdateDBRequest,
    },
};
use crate::types::{CommunityId, MembershipId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

pub struct Memberships<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Memberships<'c> {
    type CreateRequest = MembershipCreateDBRequest;
    type UpdateRequest = MembershipUpdateDBRequest;
    type Response = MembershipDBResponse;
    type Id = MembershipId;
    type Filter = MembershipFilter;

    #[instrument(
        skip(self, request),
        fields(user_id = %abbrev_uuid(&request.user_id), community_id = %abbrev_uuid(&request.community_id)),
        err
    )]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let membership = sqlx::query_as::<_, MembershipDBResponse>(
            r#"
            INSERT INTO memberships (
                id, description, start_date, end_date, status, reservations_used,
                community_id, user_id, plan_id, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.description)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.status)
        .bind(request.reservations_used)
        .bind(request.community_id)
        .bind(request.user_id)
        .bind(request.plan_id)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(membership)
    }

    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let membership =
            sqlx::query_as::<_, MembershipDBResponse>("SELECT * FROM memberships WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(membership)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let memberships =
            sqlx::query_as::<_, MembershipDBResponse>("SELECT * FROM memberships WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(&ids)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(memberships.into_iter().map(|m| (m.id, m)).collect())
    }

    #[instrument(skip(self, filter), fields(statuses = filter.statuses.len()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM memberships WHERE deleted_at IS NULL");

        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ");
            query.push_bind(user_id);
        }

        if let Some(community_id) = filter.community_id {
            query.push(" AND community_id = ");
            query.push_bind(community_id);
        }

        if !filter.statuses.is_empty() {
            let statuses: Vec<String> = filter.statuses.iter().map(|s| s.as_str().to_string()).collect();
            query.push(" AND status = ANY(");
            query.push_bind(statuses);
            query.push(")");
        }

        query.push(" ORDER BY start_date DESC, id");

        let memberships = query.build_query_as::<MembershipDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(memberships)
    }

    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result =
            sqlx::query("UPDATE memberships SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(membership_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let membership = sqlx::query_as::<_, MembershipDBResponse>(
            r#"
            UPDATE memberships SET
                description = COALESCE($2, description),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                status = COALESCE($5, status),
                reservations_used = CASE WHEN $6 THEN $7 ELSE reservations_used END,
                plan_id = COALESCE($8, plan_id),
                updated_by = $9,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.description)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.status)
        .bind(request.reservations_used.is_some())
        .bind(request.reservations_used.flatten())
        .bind(request.plan_id)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(membership)
    }
}

impl<'c> Memberships<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Most recent live membership a user holds in a community
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), community_id = %abbrev_uuid(&community_id)), err)]
    pub async fn get_by_user_and_community(
        &mut self,
        user_id: UserId,
        community_id: CommunityId,
    ) -> Result<Option<MembershipDBResponse>> {
        let membership = sqlx::query_as::<_, MembershipDBResponse>(
            r#"
            SELECT * FROM memberships
            WHERE user_id = $1 AND community_id = $2 AND deleted_at IS NULL
            ORDER BY start_date DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(community_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(membership)
    }

    /// Move every ACTIVE membership whose end date is before `now` to EXPIRED.
    ///
    /// Returns the number of memberships expired.
    #[instrument(skip(self), err)]
    pub async fn expire_overdue(&mut self, now: DateTime<Utc>, updated_by: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE memberships SET
                status = $1,
                updated_by = $3,
                updated_at = NOW()
            WHERE status = $2 AND end_date < $4 AND deleted_at IS NULL
            "#,
        )
        .bind(MembershipStatus::Expired)
        .bind(MembershipStatus::Active)
        .bind(updated_by)
        .bind(now)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
