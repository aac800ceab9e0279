//! Database repository for reservations.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::reservations::{ReservationCreateDBRequest, ReservationDBResponse, ReservationFilter, ReservationUpdateDBRequest},
};
use crate::types::{ReservationId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

pub struct Reservations<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Reservations<'c> {
    type CreateRequest = ReservationCreateDBRequest;
    type UpdateRequest = ReservationUpdateDBRequest;
    type Response = ReservationDBResponse;
    type Id = ReservationId;
    type Filter = ReservationFilter;

    #[instrument(
        skip(self, request),
        fields(user_id = %abbrev_uuid(&request.user_id), session_id = %abbrev_uuid(&request.session_id)),
        err
    )]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            INSERT INTO reservations (id, name, reservation_time, state, user_id, session_id, membership_id, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.reservation_time)
        .bind(request.state)
        .bind(request.user_id)
        .bind(request.session_id)
        .bind(request.membership_id)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let reservation =
            sqlx::query_as::<_, ReservationDBResponse>("SELECT * FROM reservations WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(reservation)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let reservations =
            sqlx::query_as::<_, ReservationDBResponse>("SELECT * FROM reservations WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(&ids)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(reservations.into_iter().map(|r| (r.id, r)).collect())
    }

    #[instrument(
        skip(self, filter),
        fields(user_ids = filter.user_ids.len(), session_ids = filter.session_ids.len(), states = filter.states.len()),
        err
    )]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM reservations WHERE deleted_at IS NULL");

        if !filter.user_ids.is_empty() {
            query.push(" AND user_id = ANY(");
            query.push_bind(&filter.user_ids);
            query.push(")");
        }

        if !filter.session_ids.is_empty() {
            query.push(" AND session_id = ANY(");
            query.push_bind(&filter.session_ids);
            query.push(")");
        }

        if !filter.states.is_empty() {
            let states: Vec<String> = filter.states.iter().map(|s| s.as_str().to_string()).collect();
            query.push(" AND state = ANY(");
            query.push_bind(states);
            query.push(")");
        }

        query.push(" ORDER BY reservation_time, id");

        let reservations = query.build_query_as::<ReservationDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(reservations)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result =
            sqlx::query("UPDATE reservations SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            UPDATE reservations SET
                name = COALESCE($2, name),
                reservation_time = COALESCE($3, reservation_time),
                state = COALESCE($4, state),
                session_id = COALESCE($5, session_id),
                membership_id = CASE WHEN $6 THEN $7 ELSE membership_id END,
                last_modification = NOW(),
                updated_by = $8,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.reservation_time)
        .bind(request.state)
        .bind(request.session_id)
        .bind(request.membership_id.is_some())
        .bind(request.membership_id.flatten())
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(reservation)
    }
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Soft-delete every live reservation in `ids`, returning how many were deleted
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn bulk_delete(&mut self, ids: &[ReservationId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result =
            sqlx::query("UPDATE reservations SET deleted_at = NOW(), updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(ids)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected())
    }
}
