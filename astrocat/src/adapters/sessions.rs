//! Session adapter, including the scheduling conflict check.

use crate::adapters::{creation_error, internal_error, update_error, validation::require_updated_by};
use crate::db::{
    handlers::{Repository, Sessions},
    models::sessions::{
        SessionConflicts, SessionCreateDBRequest, SessionDBResponse, SessionFilter, SessionTimeSlot, SessionUpdateDBRequest,
    },
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, SessionId, abbrev_uuid};
use tracing::{instrument, warn};

#[derive(Clone)]
pub struct SessionAdapter {
    db: DbPools,
}

impl SessionAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(session_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: SessionId) -> Result<SessionDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Sessions::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: Entity::Session })
    }

    #[instrument(skip(self, filter))]
    pub async fn fetch(&self, filter: &SessionFilter) -> Result<Vec<SessionDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Sessions::new(&mut conn).list(filter).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(professional_id = %abbrev_uuid(&request.professional_id)))]
    pub async fn create(&self, request: &SessionCreateDBRequest, updated_by: &str) -> Result<SessionDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Sessions::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Session, e))
    }

    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn bulk_create(&self, requests: &[SessionCreateDBRequest], updated_by: &str) -> Result<Vec<SessionDBResponse>> {
        require_updated_by(updated_by)?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.write().begin().await?;
        let sessions = Sessions::new(&mut tx)
            .bulk_create(requests, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Session, e))?;
        tx.commit().await?;

        Ok(sessions)
    }

    #[instrument(skip(self, request), fields(session_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: SessionId, request: &SessionUpdateDBRequest, updated_by: &str) -> Result<SessionDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Sessions::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Session, e))
    }

    #[instrument(skip(self), fields(session_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: SessionId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Sessions::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound { entity: Entity::Session })
        }
    }

    /// Sessions that would clash with the slot, grouped by what they share with it
    #[instrument(skip(self, slot), fields(professional_id = %abbrev_uuid(&slot.professional_id)))]
    pub async fn find_conflicts(&self, slot: &SessionTimeSlot) -> Result<SessionConflicts> {
        let mut conn = self.db.read().acquire().await?;
        Sessions::new(&mut conn).find_conflicts(slot).await.map_err(internal_error)
    }

    /// Fail with [`Error::SessionTimeConflict`] if the professional or the local is already
    /// booked for any part of the slot
    #[instrument(skip(self, slot), fields(professional_id = %abbrev_uuid(&slot.professional_id)))]
    pub async fn check_time_conflict(&self, slot: &SessionTimeSlot) -> Result<()> {
        let conflicts = self.find_conflicts(slot).await?;
        if conflicts.has_conflict() {
            warn!(
                professional_conflicts = conflicts.professional_conflicts.len(),
                local_conflicts = conflicts.local_conflicts.len(),
                "Session time conflict"
            );
            return Err(Error::SessionTimeConflict);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::sessions::SessionState;
    use crate::test_utils::{TEST_ACTOR, create_test_adapters, create_test_local, create_test_professional, session_request};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_get_update_delete(pool: PgPool) {
        let professional = create_test_professional(&pool).await;
        let local = create_test_local(&pool, "Sede Miraflores").await;
        let adapters = create_test_adapters(pool);

        let created = adapters
            .session
            .create(&session_request(professional.id, Some(local.id), nine_am(), 1), TEST_ACTOR)
            .await
            .unwrap();
        assert_eq!(created.state, SessionState::Scheduled);
        assert_eq!(adapters.session.get(created.id).await.unwrap(), created);

        let update = SessionUpdateDBRequest {
            state: Some(SessionState::Rescheduled),
            start_time: Some(nine_am() + Duration::hours(2)),
            end_time: Some(nine_am() + Duration::hours(3)),
            registered_count: Some(5),
            local_id: Some(None),
            session_link: Some(Some("https://meet.example.com/abc".to_string())),
            ..Default::default()
        };
        let updated = adapters.session.update(created.id, &update, "editor").await.unwrap();
        assert_eq!(updated.state, SessionState::Rescheduled);
        assert_eq!(updated.registered_count, 5);
        assert_eq!(updated.local_id, None);
        assert_eq!(updated.session_link.as_deref(), Some("https://meet.example.com/abc"));
        assert_eq!(updated.title, created.title);

        adapters.session.delete(created.id).await.unwrap();
        assert!(matches!(
            adapters.session.get(created.id).await,
            Err(Error::NotFound { entity: Entity::Session })
        ));
        assert!(matches!(
            adapters.session.update(Uuid::new_v4(), &SessionUpdateDBRequest::default(), "editor").await,
            Err(Error::NotFound { entity: Entity::Session })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fetch_filters_combine(pool: PgPool) {
        let coach = create_test_professional(&pool).await;
        let medic = create_test_professional(&pool).await;
        let adapters = create_test_adapters(pool);

        let sessions = adapters
            .session
            .bulk_create(
                &[
                    session_request(coach.id, None, nine_am(), 1),
                    session_request(coach.id, None, nine_am() + Duration::days(1), 1),
                    session_request(medic.id, None, nine_am(), 1),
                ],
                TEST_ACTOR,
            )
            .await
            .unwrap();
        let cancel = SessionUpdateDBRequest {
            state: Some(SessionState::Cancelled),
            ..Default::default()
        };
        adapters.session.update(sessions[1].id, &cancel, "editor").await.unwrap();

        assert_eq!(adapters.session.fetch(&SessionFilter::default()).await.unwrap().len(), 3);

        let coach_only = SessionFilter {
            professional_ids: vec![coach.id],
            ..Default::default()
        };
        let ids: Vec<_> = adapters.session.fetch(&coach_only).await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&sessions[0].id));
        assert!(ids.contains(&sessions[1].id));

        let coach_scheduled = SessionFilter {
            professional_ids: vec![coach.id],
            states: vec![SessionState::Scheduled],
            ..Default::default()
        };
        let found = adapters.session.fetch(&coach_scheduled).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, sessions[0].id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_time_conflicts(pool: PgPool) {
        let coach = create_test_professional(&pool).await;
        let other_coach = create_test_professional(&pool).await;
        let local = create_test_local(&pool, "Sede Surco").await;
        let adapters = create_test_adapters(pool);

        let booked = adapters
            .session
            .create(&session_request(coach.id, Some(local.id), nine_am(), 1), TEST_ACTOR)
            .await
            .unwrap();

        // Same professional, overlapping half hour
        let overlap = SessionTimeSlot {
            start_time: nine_am() + Duration::minutes(30),
            end_time: nine_am() + Duration::minutes(90),
            professional_id: coach.id,
            local_id: None,
            exclude_session_id: None,
        };
        let err = adapters.session.check_time_conflict(&overlap).await.unwrap_err();
        assert!(matches!(err, Error::SessionTimeConflict));
        assert_eq!(err.code(), "CONFLICT_ERROR_001");

        // Different professional, same local
        let same_room = SessionTimeSlot {
            professional_id: other_coach.id,
            local_id: Some(local.id),
            ..overlap.clone()
        };
        let conflicts = adapters.session.find_conflicts(&same_room).await.unwrap();
        assert!(conflicts.professional_conflicts.is_empty());
        assert_eq!(conflicts.local_conflicts, vec![booked.clone()]);

        // Back-to-back slots do not clash
        let next_hour = SessionTimeSlot {
            start_time: nine_am() + Duration::hours(1),
            end_time: nine_am() + Duration::hours(2),
            professional_id: coach.id,
            local_id: Some(local.id),
            exclude_session_id: None,
        };
        adapters.session.check_time_conflict(&next_hour).await.unwrap();

        // A session never clashes with itself
        let itself = SessionTimeSlot {
            exclude_session_id: Some(booked.id),
            ..overlap.clone()
        };
        adapters.session.check_time_conflict(&itself).await.unwrap();

        // Cancelled sessions free their slot
        let cancel = SessionUpdateDBRequest {
            state: Some(SessionState::Cancelled),
            ..Default::default()
        };
        adapters.session.update(booked.id, &cancel, "editor").await.unwrap();
        adapters.session.check_time_conflict(&overlap).await.unwrap();
    }
}
