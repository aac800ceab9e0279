//! Reservation adapter.

use crate::adapters::{
    creation_error, internal_error, update_error,
    validation::{parse_ids, require_updated_by},
};
use crate::db::{
    handlers::{Reports, Repository, Reservations},
    models::{
        reports::{ReportParams, ServiceReport},
        reservations::{ReservationCreateDBRequest, ReservationDBResponse, ReservationFilter, ReservationUpdateDBRequest},
    },
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, ReservationId, abbrev_uuid};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct ReservationAdapter {
    db: DbPools,
}

impl ReservationAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: ReservationId) -> Result<ReservationDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Reservations::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Reservation,
            })
    }

    /// Reservations matching every non-empty dimension of the filter
    #[instrument(skip(self, filter))]
    pub async fn fetch(&self, filter: &ReservationFilter) -> Result<Vec<ReservationDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Reservations::new(&mut conn).list(filter).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(session_id = %abbrev_uuid(&request.session_id)))]
    pub async fn create(&self, request: &ReservationCreateDBRequest, updated_by: &str) -> Result<ReservationDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Reservations::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Reservation, e))
    }

    #[instrument(skip(self, request), fields(reservation_id = %abbrev_uuid(&id)))]
    pub async fn update(
        &self,
        id: ReservationId,
        request: &ReservationUpdateDBRequest,
        updated_by: &str,
    ) -> Result<ReservationDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Reservations::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Reservation, e))
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: ReservationId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Reservations::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                entity: Entity::Reservation,
            })
        }
    }

    /// Soft-delete the listed reservations. Every id is parsed before anything is deleted.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<()> {
        let ids = parse_ids(Entity::Reservation, ids)?;
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.write().acquire().await?;
        let deleted = Reservations::new(&mut conn).bulk_delete(&ids).await.map_err(internal_error)?;
        info!("Deleted {} of {} reservations", deleted, ids.len());
        Ok(())
    }

    /// Reservations per service over `params`' window
    #[instrument(skip(self))]
    pub async fn get_service_report(&self, params: &ReportParams) -> Result<ServiceReport> {
        let mut conn = self.db.read().acquire().await?;
        Reports::new(&mut conn).service_report(params).await.map_err(internal_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::reservations::ReservationState;
    use crate::db::models::reports::{ReportBucket, UNKNOWN_SERVICE};
    use crate::test_utils::{
        TEST_ACTOR, create_test_adapters, create_test_community, create_test_professional, create_test_service, create_test_session,
        create_test_user, session_request,
    };
    use crate::types::{SessionId, UserId};
    use chrono::{TimeZone, Utc};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn reservation(user_id: UserId, session_id: SessionId) -> ReservationCreateDBRequest {
        ReservationCreateDBRequest::builder()
            .name("Morning class")
            .reservation_time(Utc::now())
            .user_id(user_id)
            .session_id(session_id)
            .build()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_get_update(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let professional = create_test_professional(&pool).await;
        let session = create_test_session(&pool, professional.id, None).await;
        let adapters = create_test_adapters(pool);

        let created = adapters
            .reservation
            .create(&reservation(user.id, session.id), TEST_ACTOR)
            .await
            .unwrap();
        assert_eq!(created.state, ReservationState::Confirmed);
        assert_eq!(adapters.reservation.get(created.id).await.unwrap(), created);

        let update = ReservationUpdateDBRequest {
            state: Some(ReservationState::Done),
            ..Default::default()
        };
        let updated = adapters.reservation.update(created.id, &update, "editor").await.unwrap();
        assert_eq!(updated.state, ReservationState::Done);
        assert!(updated.last_modification >= created.last_modification);

        assert!(matches!(
            adapters.reservation.create(&reservation(user.id, session.id), "").await,
            Err(Error::InvalidUpdatedByValue)
        ));
        assert!(matches!(
            adapters.reservation.create(&reservation(user.id, Uuid::new_v4()), TEST_ACTOR).await,
            Err(Error::NotCreated {
                entity: Entity::Reservation
            })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fetch_filters_combine(pool: PgPool) {
        let ana = create_test_user(&pool).await;
        let luis = create_test_user(&pool).await;
        let professional = create_test_professional(&pool).await;
        let morning = create_test_session(&pool, professional.id, None).await;
        let adapters = create_test_adapters(pool);

        let ana_booking = adapters.reservation.create(&reservation(ana.id, morning.id), TEST_ACTOR).await.unwrap();
        let luis_booking = adapters.reservation.create(&reservation(luis.id, morning.id), TEST_ACTOR).await.unwrap();
        let cancel = ReservationUpdateDBRequest {
            state: Some(ReservationState::Cancelled),
            ..Default::default()
        };
        adapters.reservation.update(luis_booking.id, &cancel, "editor").await.unwrap();

        let everything = adapters.reservation.fetch(&ReservationFilter::default()).await.unwrap();
        assert_eq!(everything.len(), 2);

        let by_session = ReservationFilter {
            session_ids: vec![morning.id],
            ..Default::default()
        };
        assert_eq!(adapters.reservation.fetch(&by_session).await.unwrap().len(), 2);

        let confirmed_in_session = ReservationFilter {
            session_ids: vec![morning.id],
            states: vec![ReservationState::Confirmed],
            ..Default::default()
        };
        let found = adapters.reservation.fetch(&confirmed_in_session).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ana_booking.id);

        let luis_only = ReservationFilter {
            user_ids: vec![luis.id],
            ..Default::default()
        };
        let found = adapters.reservation.fetch(&luis_only).await.unwrap();
        assert!(found.iter().all(|r| r.user_id == luis.id));
        assert_eq!(found.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_delete_validates_before_deleting(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let professional = create_test_professional(&pool).await;
        let session = create_test_session(&pool, professional.id, None).await;
        let adapters = create_test_adapters(pool);

        let first = adapters.reservation.create(&reservation(user.id, session.id), TEST_ACTOR).await.unwrap();
        let second = adapters.reservation.create(&reservation(user.id, session.id), TEST_ACTOR).await.unwrap();

        let ids = vec![first.id.to_string(), "12345".to_string(), second.id.to_string()];
        let err = adapters.reservation.bulk_delete(&ids).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidId {
                entity: Entity::Reservation
            }
        ));
        assert_eq!(err.code(), "RESERVATION_ERROR_004");

        // Nothing in the batch was touched
        assert_eq!(adapters.reservation.get(first.id).await.unwrap(), first);
        assert_eq!(adapters.reservation.get(second.id).await.unwrap(), second);

        adapters.reservation.bulk_delete(&[]).await.unwrap();
        adapters
            .reservation
            .bulk_delete(&[first.id.to_string(), second.id.to_string()])
            .await
            .unwrap();
        assert!(adapters.reservation.fetch(&ReservationFilter::default()).await.unwrap().is_empty());

        assert!(matches!(
            adapters.reservation.delete(first.id).await,
            Err(Error::NotFound {
                entity: Entity::Reservation
            })
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_service_report(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let professional = create_test_professional(&pool).await;
        let community = create_test_community(&pool, "Wellness").await;
        let yoga = create_test_service(&pool, "Yoga").await;
        let adapters = create_test_adapters(pool);

        let offering = adapters.community_service.create(community.id, yoga.id, TEST_ACTOR).await.unwrap();
        let start = Utc.with_ymd_and_hms(2025, 5, 5, 7, 0, 0).unwrap();
        let mut request = session_request(professional.id, None, start, 1);
        request.community_service_id = Some(offering.id);
        let yoga_class = adapters.session.create(&request, TEST_ACTOR).await.unwrap();
        let unlinked = adapters
            .session
            .create(&session_request(professional.id, None, start, 1), TEST_ACTOR)
            .await
            .unwrap();

        for (session_id, day) in [(yoga_class.id, 5), (yoga_class.id, 5), (yoga_class.id, 6), (unlinked.id, 6)] {
            let booking = ReservationCreateDBRequest::builder()
                .name("Class")
                .reservation_time(Utc.with_ymd_and_hms(2025, 5, day, 6, 0, 0).unwrap())
                .user_id(user.id)
                .session_id(session_id)
                .build();
            adapters.reservation.create(&booking, TEST_ACTOR).await.unwrap();
        }

        let report = adapters.reservation.get_service_report(&ReportParams::default()).await.unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.services.len(), 2);

        let yoga_row = report.services.iter().find(|s| s.service_name == "Yoga").unwrap();
        assert_eq!(yoga_row.total, 3);
        assert_eq!(
            yoga_row.data,
            vec![
                ReportBucket {
                    date: "2025-05-05".to_string(),
                    count: 2
                },
                ReportBucket {
                    date: "2025-05-06".to_string(),
                    count: 1
                },
            ]
        );

        let unknown = report.services.iter().find(|s| s.service_name == UNKNOWN_SERVICE).unwrap();
        assert_eq!(unknown.total, 1);

        // An empty window yields an empty report
        let params = ReportParams {
            from: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let report = adapters.reservation.get_service_report(&params).await.unwrap();
        assert_eq!(report.total, 0);
        assert!(report.services.is_empty());
    }
}
