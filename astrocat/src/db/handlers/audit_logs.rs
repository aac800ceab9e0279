//! Database repository for the audit trail.
//!
//! Entries are append-only: there is no update, and the only removal is the retention purge in
//! [`AuditLogs::delete_older_than`].

use crate::db::{
    errors::Result,
    models::audit_logs::{AuditContext, AuditCount, AuditEvent, AuditLogDBResponse, AuditLogFilter, AuditStats, window_start},
};
use crate::types::{AuditLogId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

pub struct AuditLogs<'c> {
    db: &'c mut PgConnection,
}

#[derive(FromRow)]
struct Totals {
    total_events: i64,
    success_count: i64,
    failure_count: i64,
}

/// Append WHERE conditions for every constraint set on the filter
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &AuditLogFilter) {
    query.push(" WHERE TRUE");

    if !filter.user_ids.is_empty() {
        query.push(" AND user_id = ANY(");
        query.push_bind(filter.user_ids.clone());
        query.push(")");
    }

    if !filter.actions.is_empty() {
        let actions: Vec<String> = filter.actions.iter().map(|a| a.as_str().to_string()).collect();
        query.push(" AND action = ANY(");
        query.push_bind(actions);
        query.push(")");
    }

    if !filter.entity_types.is_empty() {
        let entity_types: Vec<String> = filter.entity_types.iter().map(|e| e.as_str().to_string()).collect();
        query.push(" AND entity_type = ANY(");
        query.push_bind(entity_types);
        query.push(")");
    }

    if !filter.user_roles.is_empty() {
        let roles: Vec<String> = filter.user_roles.iter().map(|r| r.as_str().to_string()).collect();
        query.push(" AND user_role = ANY(");
        query.push_bind(roles);
        query.push(")");
    }

    if let Some(start_date) = filter.start_date {
        query.push(" AND created_at >= ");
        query.push_bind(start_date);
    }

    if let Some(end_date) = filter.end_date {
        query.push(" AND created_at <= ");
        query.push_bind(end_date);
    }

    if let Some(success) = filter.success {
        query.push(" AND success = ");
        query.push_bind(success);
    }
}

impl<'c> AuditLogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(
        skip(self, context, event),
        fields(user_id = %abbrev_uuid(&context.user_id), action = event.action.as_str(), entity_type = event.entity_type.as_str()),
        err
    )]
    pub async fn insert(&mut self, context: &AuditContext, event: &AuditEvent) -> Result<AuditLogDBResponse> {
        let log = sqlx::query_as::<_, AuditLogDBResponse>(
            r#"
            INSERT INTO audit_logs (
                id, user_id, user_email, user_role, action, entity_type, entity_id, entity_name,
                old_values, new_values, ip_address, user_agent, additional_info, success, error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(context.user_id)
        .bind(&context.user_email)
        .bind(context.user_role)
        .bind(event.action)
        .bind(event.entity_type)
        .bind(event.entity_id)
        .bind(&event.entity_name)
        .bind(&event.old_values)
        .bind(&event.new_values)
        .bind(&context.ip_address)
        .bind(&context.user_agent)
        .bind(&event.additional_info)
        .bind(event.success)
        .bind(&event.error_message)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(log)
    }

    #[instrument(skip(self), fields(audit_log_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: AuditLogId) -> Result<Option<AuditLogDBResponse>> {
        let log = sqlx::query_as::<_, AuditLogDBResponse>("SELECT * FROM audit_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(log)
    }

    /// Number of entries matching the filter, ignoring pagination
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &AuditLogFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
        push_filters(&mut query, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// One page of matching entries, newest first. The filter must already be normalised.
    #[instrument(skip(self, filter), fields(page = filter.page, page_size = filter.page_size), err)]
    pub async fn list(&mut self, filter: &AuditLogFilter) -> Result<Vec<AuditLogDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM audit_logs");
        push_filters(&mut query, filter);

        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(filter.page_size);
        query.push(" OFFSET ");
        query.push_bind(filter.offset());

        let logs = query.build_query_as::<AuditLogDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(logs)
    }

    /// Aggregate the entries created since `since`, optionally only successes or failures
    #[instrument(skip(self), err)]
    pub async fn stats(&mut self, since: DateTime<Utc>, success: Option<bool>) -> Result<AuditStats> {
        let totals = sqlx::query_as::<_, Totals>(
            r#"
            SELECT
                COUNT(*) AS total_events,
                COUNT(*) FILTER (WHERE success) AS success_count,
                COUNT(*) FILTER (WHERE NOT success) AS failure_count
            FROM audit_logs
            WHERE created_at >= $1 AND ($2::boolean IS NULL OR success = $2)
            "#,
        )
        .bind(since)
        .bind(success)
        .fetch_one(&mut *self.db)
        .await?;

        // Active users ignore the success filter
        let active_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_email) FROM audit_logs WHERE created_at >= $1 AND user_email <> ''",
        )
        .bind(since)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(AuditStats {
            total_events: totals.total_events,
            success_count: totals.success_count,
            failure_count: totals.failure_count,
            active_users,
            actions: self.count_by("action", since, success).await?,
            user_roles: self.count_by("user_role", since, success).await?,
            entity_types: self.count_by("entity_type", since, success).await?,
        })
    }

    async fn count_by(&mut self, column: &'static str, since: DateTime<Utc>, success: Option<bool>) -> Result<Vec<AuditCount>> {
        let sql = format!(
            r#"
            SELECT {column} AS key, COUNT(*) AS count
            FROM audit_logs
            WHERE created_at >= $1 AND ($2::boolean IS NULL OR success = $2)
            GROUP BY {column}
            ORDER BY count DESC, key
            "#
        );

        let counts = sqlx::query_as::<_, AuditCount>(&sql)
            .bind(since)
            .bind(success)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(counts)
    }

    /// Permanently delete entries older than `days` days, returning how many went.
    /// The window is clamped as in [`window_start`].
    #[instrument(skip(self), err)]
    pub async fn delete_older_than(&mut self, days: i64) -> Result<u64> {
        let cutoff = window_start(Utc::now(), days);

        let result = sqlx::query("DELETE FROM audit_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut *self.db)
            .await?;

        info!("Deleted {} audit log entries older than {} days", result.rows_affected(), days);

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::audit_logs::{AuditAction, AuditEntityType};
    use crate::db::models::users::UserRole;
    use chrono::Duration;
    use sqlx::PgPool;

    fn context(role: UserRole) -> AuditContext {
        AuditContext {
            user_id: Uuid::new_v4(),
            user_email: "auditor@example.com".to_string(),
            user_role: role,
            ip_address: "10.0.0.1".to_string(),
            user_agent: Some("integration-test".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_insert_keeps_snapshots(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = AuditLogs::new(&mut conn);

        let mut event = AuditEvent::succeeded(AuditAction::Update, AuditEntityType::Plan);
        event.entity_id = Some(Uuid::new_v4());
        event.old_values = Some(serde_json::json!({"fee": "10.00"}));
        event.new_values = Some(serde_json::json!({"fee": "12.00"}));

        let log = repo.insert(&context(UserRole::Admin), &event).await.unwrap();
        assert_eq!(log.new_values, event.new_values);
        assert_eq!(log.old_values, event.old_values);
        assert_eq!(log.entity_id, event.entity_id);

        assert_eq!(repo.get_by_id(log.id).await.unwrap(), Some(log));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_is_paginated_newest_first(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = AuditLogs::new(&mut conn);

        let ctx = context(UserRole::Client);
        for _ in 0..5 {
            repo.insert(&ctx, &AuditEvent::succeeded(AuditAction::Login, AuditEntityType::User))
                .await
                .unwrap();
        }

        let filter = AuditLogFilter {
            page: 2,
            page_size: 2,
            ..Default::default()
        }
        .normalized();

        assert_eq!(repo.count(&filter).await.unwrap(), 5);

        let page = repo.list(&filter).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at >= page[1].created_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_stats_and_purge(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = AuditLogs::new(&mut conn);

        let admin = context(UserRole::Admin);
        let client = AuditContext {
            user_email: "client@example.com".to_string(),
            ..context(UserRole::Client)
        };

        repo.insert(&admin, &AuditEvent::succeeded(AuditAction::Create, AuditEntityType::Community))
            .await
            .unwrap();
        repo.insert(&admin, &AuditEvent::succeeded(AuditAction::Create, AuditEntityType::Plan))
            .await
            .unwrap();
        repo.insert(
            &client,
            &AuditEvent::failed(AuditAction::CreateReservation, AuditEntityType::Reservation, "Session full"),
        )
        .await
        .unwrap();

        let since = Utc::now() - Duration::days(30);
        let stats = repo.stats(since, None).await.unwrap();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.failure_count, 1);
        assert_eq!(stats.active_users, 2);
        assert_eq!(
            stats.actions[0],
            AuditCount {
                key: "CREATE".to_string(),
                count: 2
            }
        );

        let failures = repo.stats(since, Some(false)).await.unwrap();
        assert_eq!(failures.total_events, 1);
        assert_eq!(failures.success_count, 0);
        assert_eq!(failures.entity_types.len(), 1);
        assert_eq!(failures.entity_types[0].key, "RESERVATION");

        // Backdate one entry past the retention window
        sqlx::query("UPDATE audit_logs SET created_at = NOW() - INTERVAL '120 days' WHERE action = 'CREATE_RESERVATION'")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(repo.delete_older_than(90).await.unwrap(), 1);
        assert_eq!(repo.count(&AuditLogFilter::default().normalized()).await.unwrap(), 2);

        // A window longer than any stored timestamp deletes nothing
        assert_eq!(repo.delete_older_than(i64::MAX).await.unwrap(), 0);
        assert_eq!(repo.count(&AuditLogFilter::default().normalized()).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_past_last_page_is_empty(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = AuditLogs::new(&mut conn);

        repo.insert(&context(UserRole::Admin), &AuditEvent::succeeded(AuditAction::Login, AuditEntityType::User))
            .await
            .unwrap();

        let filter = AuditLogFilter {
            page: i64::MAX,
            page_size: 10,
            ..Default::default()
        }
        .normalized();
        assert!(repo.list(&filter).await.unwrap().is_empty());
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }
}
