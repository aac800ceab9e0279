//! Database repository for professionals.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::professionals::{ProfessionalCreateDBRequest, ProfessionalDBResponse, ProfessionalUpdateDBRequest},
};
use crate::types::{ProfessionalId, abbrev_uuid};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

pub struct Professionals<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Professionals<'c> {
    type CreateRequest = ProfessionalCreateDBRequest;
    type UpdateRequest = ProfessionalUpdateDBRequest;
    type Response = ProfessionalDBResponse;
    type Id = ProfessionalId;
    type Filter = ();

    #[instrument(skip(self, request), fields(professional_type = ?request.professional_type), err)]
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response> {
        let professional = sqlx::query_as::<_, ProfessionalDBResponse>(
            r#"
            INSERT INTO professionals (
                id, name, first_last_name, second_last_name, specialty, email, phone_number,
                type, image_url, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.first_last_name)
        .bind(&request.second_last_name)
        .bind(&request.specialty)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(request.professional_type)
        .bind(&request.image_url)
        .bind(updated_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(professional)
    }

    #[instrument(skip(self), fields(professional_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let professional =
            sqlx::query_as::<_, ProfessionalDBResponse>("SELECT * FROM professionals WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(professional)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let professionals =
            sqlx::query_as::<_, ProfessionalDBResponse>("SELECT * FROM professionals WHERE id = ANY($1) AND deleted_at IS NULL")
                .bind(&ids)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(professionals.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let professionals = sqlx::query_as::<_, ProfessionalDBResponse>(
            "SELECT * FROM professionals WHERE deleted_at IS NULL ORDER BY first_last_name, name, id",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(professionals)
    }

    #[instrument(skip(self), fields(professional_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result =
            sqlx::query("UPDATE professionals SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(professional_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response> {
        let professional = sqlx::query_as::<_, ProfessionalDBResponse>(
            r#"
            UPDATE professionals SET
                name = COALESCE($2, name),
                first_last_name = COALESCE($3, first_last_name),
                second_last_name = CASE WHEN $4 THEN $5 ELSE second_last_name END,
                specialty = COALESCE($6, specialty),
                email = COALESCE($7, email),
                phone_number = COALESCE($8, phone_number),
                type = COALESCE($9, type),
                image_url = COALESCE($10, image_url),
                updated_by = $11,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.first_last_name)
        .bind(request.second_last_name.is_some())
        .bind(request.second_last_name.clone().flatten())
        .bind(&request.specialty)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(request.professional_type)
        .bind(&request.image_url)
        .bind(updated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(professional)
    }
}

impl<'c> Professionals<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}
