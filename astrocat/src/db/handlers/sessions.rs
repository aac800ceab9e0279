//! Database repository for sessions.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::sessions::{
        SessionConflicts, SessionCreateDBRequest, SessionDBResponse, SessionFilter, SessionTimeSlot, SessionUpdateDBRequest,
    },
};
use crate::types::{SessionId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

pub struct Sessions<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Sessions<'c> {
    type CreateRequest = SessionCreateDBRequest;
    type UpdateRequest = SessionUpdateDBRequest;
    type Response = SessionDBResponse;
    type Id = SessionId;
    type Filter = SessionFilter;

    #[instrument(skip(self, request), fields(title = %request.title, professional_id = %abbrev_uuid(&request.professional_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        // state and registered_count come from the column defaults
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            INSERT INTO sessions (
                id, title, date, start_time, end_time, capacity, session_link,
                professional_id, local_id, community_service_id, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.title)
        .bind(request.date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.capacity)
        .bind(&request.session_link)
        .bind(request.professional_id)
        .bind(request.local_id)
        .bind(request.community_service_id)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(session)
    }

    #[instrument(skip(self), fields(session_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let session = sqlx::query_as::<_, SessionDBResponse>("SELECT * FROM sessions WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(session)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sessions = sqlx::query_as::<_, SessionDBResponse>("SELECT * FROM sessions WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(sessions.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(
        skip(self, filter),
        fields(
            professional_ids = filter.professional_ids.len(),
            local_ids = filter.local_ids.len(),
            states = filter.states.len()
        ),
        err
    )]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM sessions WHERE deleted_at IS NULL");

        if !filter.professional_ids.is_empty() {
            query.push(" AND professional_id = ANY(");
            query.push_bind(&filter.professional_ids);
            query.push(")");
        }

        if !filter.local_ids.is_empty() {
            query.push(" AND local_id = ANY(");
            query.push_bind(&filter.local_ids);
            query.push(")");
        }

        if !filter.states.is_empty() {
            let states: Vec<String> = filter.states.iter().map(|s| s.as_str().to_string()).collect();
            query.push(" AND state = ANY(");
            query.push_bind(states);
            query.push(")");
        }

        query.push(" ORDER BY start_time, id");

        let sessions = query.build_query_as::<SessionDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(sessions)
    }

    #[instrument(skip(self), fields(session_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(session_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            UPDATE sessions SET
                title = COALESCE($2, title),
                date = COALESCE($3, date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                state = COALESCE($6, state),
                registered_count = COALESCE($7, registered_count),
                capacity = COALESCE($8, capacity),
                session_link = CASE WHEN $9 THEN $10 ELSE session_link END,
                professional_id = COALESCE($11, professional_id),
                local_id = CASE WHEN $12 THEN $13 ELSE local_id END,
                community_service_id = CASE WHEN $14 THEN $15 ELSE community_service_id END,
                updated_by = $16,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(request.date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.state)
        .bind(request.registered_count)
        .bind(request.capacity)
        .bind(request.session_link.is_some())
        .bind(request.session_link.clone().flatten())
        .bind(request.professional_id)
        .bind(request.local_id.is_some())
        .bind(request.local_id.flatten())
        .bind(request.community_service_id.is_some())
        .bind(request.community_service_id.flatten())
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(session)
    }
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Find live, non-cancelled sessions overlapping the slot.
    ///
    /// Two ranges overlap when each starts before the other ends; touching ranges do not.
    #[instrument(
        skip(self, slot),
        fields(professional_id = %abbrev_uuid(&slot.professional_id), has_local = slot.local_id.is_some()),
        err
    )]
    pub async fn find_conflicts(&mut self, slot: &SessionTimeSlot) -> Result<SessionConflicts> {
        let professional_conflicts = self.overlapping("professional_id", slot.professional_id, slot).await?;

        let local_conflicts = match slot.local_id {
            Some(local_id) => self.overlapping("local_id", local_id, slot).await?,
            None => Vec::new(),
        };

        Ok(SessionConflicts {
            professional_conflicts,
            local_conflicts,
        })
    }

    async fn overlapping(&mut self, column: &'static str, value: Uuid, slot: &SessionTimeSlot) -> Result<Vec<SessionDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM sessions WHERE deleted_at IS NULL AND state <> 'CANCELLED' AND ");
        query.push(column);
        query.push(" = ");
        query.push_bind(value);
        query.push(" AND start_time < ");
        query.push_bind(slot.end_time);
        query.push(" AND end_time > ");
        query.push_bind(slot.start_time);

        if let Some(exclude) = slot.exclude_session_id {
            query.push(" AND id <> ");
            query.push_bind(exclude);
        }

        query.push(" ORDER BY start_time, id");

        let sessions = query.build_query_as::<SessionDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(sessions)
    }
}
