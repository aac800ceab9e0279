//! Aggregate queries behind the admin dashboard reports.
//!
//! Reports only read. Soft-deleted memberships and reservations are left out; a reservation
//! whose service was deleted is reported under [`UNKNOWN_SERVICE`].

use crate::db::{
    errors::Result,
    models::reports::{CommunityReport, CommunityReportRow, ReportBucket, ReportParams, ServiceReport, ServiceReportRow, UNKNOWN_SERVICE},
};
use crate::types::CommunityId;
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

pub struct Reports<'c> {
    db: &'c mut PgConnection,
}

#[derive(FromRow)]
struct CommunityBucketRow {
    community_id: CommunityId,
    bucket: String,
    count: i64,
}

#[derive(FromRow)]
struct ServiceBucketRow {
    service_name: String,
    bucket: String,
    count: i64,
}

impl<'c> Reports<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Per-community membership, engagement and plan figures, ordered by community name
    #[instrument(skip(self), err)]
    pub async fn community_report(&mut self, params: &ReportParams) -> Result<CommunityReport> {
        let mut communities = sqlx::query_as::<_, CommunityReportRow>(
            r#"
            WITH booked AS (
                SELECT m.community_id, r.user_id
                FROM reservations r
                JOIN memberships m ON m.id = r.membership_id
                WHERE r.deleted_at IS NULL
                  AND ($1::timestamptz IS NULL OR r.reservation_time >= $1)
                  AND ($2::timestamptz IS NULL OR r.reservation_time <= $2)
            ),
            windowed AS (
                SELECT m.*, EXISTS (
                    SELECT 1 FROM booked b WHERE b.community_id = m.community_id AND b.user_id = m.user_id
                ) AS has_booked
                FROM memberships m
                WHERE m.deleted_at IS NULL
                  AND ($1::timestamptz IS NULL OR m.end_date >= $1)
                  AND ($2::timestamptz IS NULL OR m.start_date <= $2)
            )
            SELECT
                c.id AS community_id,
                c.name AS community_name,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE w.status = 'ACTIVE') AS active_memberships,
                COUNT(*) FILTER (WHERE w.status = 'EXPIRED') AS expired_memberships,
                COUNT(*) FILTER (WHERE w.status = 'CANCELLED') AS cancelled_memberships,
                COUNT(DISTINCT w.user_id) FILTER (WHERE w.has_booked) AS active_users,
                COUNT(DISTINCT w.user_id) FILTER (WHERE NOT w.has_booked) AS inactive_users,
                (SELECT COUNT(*) FROM booked b WHERE b.community_id = c.id) AS total_reservations,
                COUNT(*) FILTER (WHERE p.type = 'MONTHLY') AS monthly_plans,
                COUNT(*) FILTER (WHERE p.type = 'ANUAL') AS annual_plans
            FROM windowed w
            JOIN communities c ON c.id = w.community_id AND c.deleted_at IS NULL
            JOIN plans p ON p.id = w.plan_id
            GROUP BY c.id, c.name
            ORDER BY c.name, c.id
            "#,
        )
        .bind(params.from)
        .bind(params.to)
        .fetch_all(&mut *self.db)
        .await?;

        let buckets = sqlx::query_as::<_, CommunityBucketRow>(
            r#"
            SELECT m.community_id, to_char(m.start_date AT TIME ZONE 'UTC', $3) AS bucket, COUNT(*) AS count
            FROM memberships m
            JOIN communities c ON c.id = m.community_id AND c.deleted_at IS NULL
            WHERE m.deleted_at IS NULL
              AND ($1::timestamptz IS NULL OR m.end_date >= $1)
              AND ($2::timestamptz IS NULL OR m.start_date <= $2)
            GROUP BY m.community_id, bucket
            ORDER BY m.community_id, bucket
            "#,
        )
        .bind(params.from)
        .bind(params.to)
        .bind(params.group_by.pg_format())
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_community: HashMap<CommunityId, Vec<ReportBucket>> = HashMap::new();
        for row in buckets {
            by_community.entry(row.community_id).or_default().push(ReportBucket {
                date: row.bucket,
                count: row.count,
            });
        }
        for community in &mut communities {
            community.data = by_community.remove(&community.community_id).unwrap_or_default();
        }

        Ok(CommunityReport {
            total: communities.iter().map(|c| c.total).sum(),
            communities,
        })
    }

    /// Reservations per service name, bucketed by reservation time
    #[instrument(skip(self), err)]
    pub async fn service_report(&mut self, params: &ReportParams) -> Result<ServiceReport> {
        let rows = sqlx::query_as::<_, ServiceBucketRow>(
            r#"
            SELECT
                COALESCE(s.name, $3) AS service_name,
                to_char(r.reservation_time AT TIME ZONE 'UTC', $4) AS bucket,
                COUNT(*) AS count
            FROM reservations r
            JOIN sessions se ON se.id = r.session_id
            LEFT JOIN community_services cs ON cs.id = se.community_service_id
            LEFT JOIN services s ON s.id = cs.service_id AND s.deleted_at IS NULL
            WHERE r.deleted_at IS NULL
              AND ($1::timestamptz IS NULL OR r.reservation_time >= $1)
              AND ($2::timestamptz IS NULL OR r.reservation_time <= $2)
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(params.from)
        .bind(params.to)
        .bind(UNKNOWN_SERVICE)
        .bind(params.group_by.pg_format())
        .fetch_all(&mut *self.db)
        .await?;

        // Rows arrive sorted by service name, so each service is one contiguous run
        let mut services: Vec<ServiceReportRow> = Vec::new();
        for row in rows {
            let bucket = ReportBucket {
                date: row.bucket,
                count: row.count,
            };
            match services.last_mut() {
                Some(service) if service.service_name == row.service_name => {
                    service.total += bucket.count;
                    service.data.push(bucket);
                }
                _ => services.push(ServiceReportRow {
                    service_name: row.service_name,
                    total: bucket.count,
                    data: vec![bucket],
                }),
            }
        }

        Ok(ServiceReport {
            total: services.iter().map(|s| s.total).sum(),
            services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Memberships, Repository, Reservations, Sessions};
    use crate::db::models::{
        memberships::MembershipStatus, reports::ReportGrouping, reservations::ReservationCreateDBRequest,
    };
    use crate::test_utils::{
        TEST_ACTOR, create_test_community, create_test_plan, create_test_professional, create_test_user, membership_request,
        session_request,
    };
    use chrono::{TimeZone, Utc};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_service_report_groups_by_week(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let professional = create_test_professional(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let session = Sessions::new(&mut conn)
            .create(&session_request(professional.id, None, start, 1), TEST_ACTOR)
            .await
            .unwrap();

        // Monday and Sunday of ISO week 10, then Monday of week 11
        for day in [3, 9, 10] {
            let request = ReservationCreateDBRequest::builder()
                .name("Morning class")
                .reservation_time(Utc.with_ymd_and_hms(2025, 3, day, 8, 0, 0).unwrap())
                .user_id(user.id)
                .session_id(session.id)
                .build();
            Reservations::new(&mut conn).create(&request, TEST_ACTOR).await.unwrap();
        }

        let params = ReportParams {
            group_by: ReportGrouping::Week,
            ..Default::default()
        };
        let report = Reports::new(&mut conn).service_report(&params).await.unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.services.len(), 1);
        assert_eq!(report.services[0].service_name, UNKNOWN_SERVICE);
        assert_eq!(
            report.services[0].data,
            vec![
                ReportBucket {
                    date: "2025-W10".to_string(),
                    count: 2
                },
                ReportBucket {
                    date: "2025-W11".to_string(),
                    count: 1
                },
            ]
        );

        let params = ReportParams {
            from: Some(Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()),
            group_by: ReportGrouping::Month,
            ..Default::default()
        };
        let report = Reports::new(&mut conn).service_report(&params).await.unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.services[0].data[0].date, "2025-03");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_community_report_counts_statuses(pool: PgPool) {
        let ana = create_test_user(&pool).await;
        let luis = create_test_user(&pool).await;
        let community = create_test_community(&pool, "Runners").await;
        let plan = create_test_plan(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let jan = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
        let mut expired = membership_request(luis.id, community.id, plan.id, jan, feb);
        expired.status = MembershipStatus::Expired;

        let mut repo = Memberships::new(&mut conn);
        repo.create(&membership_request(ana.id, community.id, plan.id, jan, feb), TEST_ACTOR)
            .await
            .unwrap();
        repo.create(&expired, TEST_ACTOR).await.unwrap();

        let report = Reports::new(&mut conn).community_report(&ReportParams::default()).await.unwrap();
        assert_eq!(report.total, 2);
        let row = &report.communities[0];
        assert_eq!(row.community_name, "Runners");
        assert_eq!(row.active_memberships, 1);
        assert_eq!(row.expired_memberships, 1);
        assert_eq!(row.monthly_plans, 2);
        assert_eq!(row.inactive_users, 2);
        assert_eq!(row.total_reservations, 0);
        assert_eq!(
            row.data,
            vec![ReportBucket {
                date: "2025-01-10".to_string(),
                count: 2
            }]
        );
    }
}
