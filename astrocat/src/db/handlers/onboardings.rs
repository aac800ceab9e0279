//! Database repository for onboarding profiles.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::onboardings::{OnboardingCreateDBRequest, OnboardingDBResponse, OnboardingUpdateDBRequest},
};
use crate::types::{OnboardingId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Name of the partial unique index allowing one live onboarding per user
pub const USER_UNIQUE_CONSTRAINT: &str = "onboardings_user_unique";

pub struct Onboardings<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Onboardings<'c> {
    type CreateRequest = OnboardingCreateDBRequest;
    type UpdateRequest = OnboardingUpdateDBRequest;
    type Response = OnboardingDBResponse;
    type Id = OnboardingId;
    type Filter = ();

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let onboarding = sqlx::query_as::<_, OnboardingDBResponse>(
            r#"
            INSERT INTO onboardings (
                id, user_id, phone_number, document_type, document_number, street_name,
                building_number, district, province, region, reference, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.phone_number)
        .bind(request.document_type)
        .bind(&request.document_number)
        .bind(&request.street_name)
        .bind(&request.building_number)
        .bind(&request.district)
        .bind(&request.province)
        .bind(&request.region)
        .bind(&request.reference)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(onboarding)
    }

    #[instrument(skip(self), fields(onboarding_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let onboarding =
            sqlx::query_as::<_, OnboardingDBResponse>("SELECT * FROM onboardings WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(onboarding)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let onboardings =
            sqlx::query_as::<_, OnboardingDBResponse>("SELECT * FROM onboardings WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(&ids)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(onboardings.into_iter().map(|o| (o.id, o)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let onboardings =
            sqlx::query_as::<_, OnboardingDBResponse>("SELECT * FROM onboardings WHERE deleted_at IS NULL ORDER BY created_at, id")
                .fetch_all(&mut *self.db)
                .await?;

        Ok(onboardings)
    }

    #[instrument(skip(self), fields(onboarding_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result =
            sqlx::query("UPDATE onboardings SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(onboarding_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let onboarding = sqlx::query_as::<_, OnboardingDBResponse>(
            r#"
            UPDATE onboardings SET
                phone_number = COALESCE($2, phone_number),
                document_type = COALESCE($3, document_type),
                document_number = COALESCE($4, document_number),
                street_name = COALESCE($5, street_name),
                building_number = COALESCE($6, building_number),
                district = COALESCE($7, district),
                province = COALESCE($8, province),
                region = COALESCE($9, region),
                reference = COALESCE($10, reference),
                updated_by = $11,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.phone_number)
        .bind(request.document_type)
        .bind(&request.document_number)
        .bind(&request.street_name)
        .bind(&request.building_number)
        .bind(&request.district)
        .bind(&request.province)
        .bind(&request.region)
        .bind(&request.reference)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(onboarding)
    }
}

impl<'c> Onboardings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_by_user(&mut self, user_id: UserId) -> Result<Option<OnboardingDBResponse>> {
        let onboarding =
            sqlx::query_as::<_, OnboardingDBResponse>("SELECT * FROM onboardings WHERE user_id = $1 AND deleted_at IS NULL")
                .bind(user_id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(onboarding)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn delete_by_user(&mut self, user_id: UserId) -> Result<bool> {
        let result =
            sqlx::query("UPDATE onboardings SET deleted_at = NOW(), updated_at = NOW() WHERE user_id = $1 AND deleted_at IS NULL")
                .bind(user_id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
