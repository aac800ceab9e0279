//! Database repository for membership suspensions.
//!
//! A suspension is opened when a membership is put on hold and closed by stamping
//! `resumed_at`. Only the latest open suspension of a membership is ever resumed.

use crate::db::{
    errors::{DbError, Result},
    models::memberships::MembershipSuspensionDBResponse,
};
use crate::types::{MembershipId, MembershipSuspensionId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct MembershipSuspensions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> MembershipSuspensions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Open a suspension starting now
    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&membership_id)), err)]
    pub async fn create(&mut self, membership_id: MembershipId, updated_by: &str) -> Result<MembershipSuspensionDBResponse> {
        let suspension = sqlx::query_as::<_, MembershipSuspensionDBResponse>(
            r#"
            INSERT INTO membership_suspensions (id, membership_id, suspended_at, updated_by)
            VALUES ($1, $2, NOW(), $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(membership_id)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(suspension)
    }

    #[instrument(skip(self), fields(suspension_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: MembershipSuspensionId) -> Result<Option<MembershipSuspensionDBResponse>> {
        let suspension = sqlx::query_as::<_, MembershipSuspensionDBResponse>(
            "SELECT * FROM membership_suspensions WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(suspension)
    }

    #[instrument(skip(self), fields(membership_id = %abbrev_uuid(&membership_id)), err)]
    pub async fn get_latest_open(&mut self, membership_id: MembershipId) -> Result<Option<MembershipSuspensionDBResponse>> {
        let suspension = sqlx::query_as::<_, MembershipSuspensionDBResponse>(
            r#"
            SELECT * FROM membership_suspensions
            WHERE membership_id = $1 AND resumed_at IS NULL AND deleted_at IS NULL
            ORDER BY suspended_at DESC
            LIMIT 1
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(suspension)
    }

    /// Close an open suspension. Fails with NotFound if it is missing or already resumed.
    #[instrument(skip(self), fields(suspension_id = %abbrev_uuid(&id)), err)]
    pub async fn resume(&mut self, id: MembershipSuspensionId, updated_by: &str) -> Result<MembershipSuspensionDBResponse> {
        let suspension = sqlx::query_as::<_, MembershipSuspensionDBResponse>(
            r#"
            UPDATE membership_suspensions SET
                resumed_at = NOW(),
                updated_by = $2,
                updated_at = NOW()
            WHERE id = $1 AND resumed_at IS NULL AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(suspension)
    }
}
