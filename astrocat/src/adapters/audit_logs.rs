//! Audit log adapter: append, query, aggregate, purge.

use crate::adapters::{creation_error, internal_error};
use crate::db::{
    handlers::AuditLogs,
    models::audit_logs::{AuditContext, AuditEvent, AuditLogDBResponse, AuditLogFilter, AuditLogPage, AuditStats, window_start},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{AuditLogId, Entity, abbrev_uuid};
use chrono::Utc;
use tracing::instrument;

/// Window used by [`AuditLogAdapter::get_stats`] when the caller passes a non-positive one
pub const DEFAULT_STATS_DAYS: i64 = 30;
/// Retention used by [`AuditLogAdapter::delete_old`] when the caller passes a non-positive one
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

#[derive(Clone)]
pub struct AuditLogAdapter {
    db: DbPools,
}

impl AuditLogAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self, context, event), fields(action = event.action.as_str(), user_id = %abbrev_uuid(&context.user_id)))]
    pub async fn log_audit_event(&self, context: &AuditContext, event: &AuditEvent) -> Result<AuditLogDBResponse> {
        let mut conn = self.db.write().acquire().await?;
        AuditLogs::new(&mut conn)
            .insert(context, event)
            .await
            .map_err(|e| creation_error(Entity::AuditLog, e))
    }

    /// One page of matching entries, newest first, with the total match count
    #[instrument(skip(self, filter))]
    pub async fn get_audit_logs(&self, filter: AuditLogFilter) -> Result<AuditLogPage> {
        let filter = filter.normalized();

        let mut conn = self.db.read().acquire().await?;
        let mut repo = AuditLogs::new(&mut conn);
        let total_count = repo.count(&filter).await.map_err(internal_error)?;
        let logs = repo.list(&filter).await.map_err(internal_error)?;

        Ok(AuditLogPage::new(logs, total_count, &filter))
    }

    #[instrument(skip(self), fields(audit_log_id = %abbrev_uuid(&id)))]
    pub async fn get_by_id(&self, id: AuditLogId) -> Result<AuditLogDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        AuditLogs::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::AuditLog,
            })
    }

    /// Aggregates over the last `days` days, optionally only successes or only failures
    #[instrument(skip(self))]
    pub async fn get_stats(&self, days: i64, success: Option<bool>) -> Result<AuditStats> {
        let days = if days <= 0 { DEFAULT_STATS_DAYS } else { days };
        let since = window_start(Utc::now(), days);

        let mut conn = self.db.read().acquire().await?;
        AuditLogs::new(&mut conn).stats(since, success).await.map_err(internal_error)
    }

    /// Permanently delete entries older than `days` days, returning how many went
    #[instrument(skip(self))]
    pub async fn delete_old(&self, days: i64) -> Result<u64> {
        let days = if days <= 0 { DEFAULT_RETENTION_DAYS } else { days };

        let mut conn = self.db.write().acquire().await?;
        AuditLogs::new(&mut conn).delete_older_than(days).await.map_err(internal_error)
    }
}
