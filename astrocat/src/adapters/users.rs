//! User adapter.
//!
//! Deleting a user also soft-deletes their onboarding profile; both statements run in one
//! transaction.

use crate::adapters::{creation_error, internal_error, update_error, validation::require_updated_by};
use crate::db::{
    errors::DbError,
    handlers::{Repository, Users, users::EMAIL_UNIQUE_CONSTRAINT},
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, UserId, abbrev_uuid};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct UserAdapter {
    db: DbPools,
}

fn duplicate_email_or(err: DbError, fallback: impl FnOnce(DbError) -> Error) -> Error {
    if err.is_unique_violation_on(EMAIL_UNIQUE_CONSTRAINT) {
        debug!("User email already registered");
        Error::DuplicateEmail
    } else {
        fallback(err)
    }
}

impl UserAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: UserId) -> Result<UserDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Users::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: Entity::User })
    }

    /// Exact match against the stored email
    #[instrument(skip(self, email))]
    pub async fn get_by_email(&self, email: &str) -> Result<UserDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Users::new(&mut conn)
            .get_user_by_email(email)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: Entity::User })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<UserDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Users::new(&mut conn).list(&()).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(role = ?request.role))]
    pub async fn create(&self, request: &UserCreateDBRequest, updated_by: &str) -> Result<UserDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Users::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| duplicate_email_or(e, |e| creation_error(Entity::User, e)))
    }

    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn bulk_create(&self, requests: &[UserCreateDBRequest], updated_by: &str) -> Result<Vec<UserDBResponse>> {
        require_updated_by(updated_by)?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.write().begin().await?;
        let users = Users::new(&mut tx)
            .bulk_create(requests, updated_by)
            .await
            .map_err(|e| duplicate_email_or(e, |e| creation_error(Entity::User, e)))?;
        tx.commit().await?;

        Ok(users)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: UserId, request: &UserUpdateDBRequest, updated_by: &str) -> Result<UserDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Users::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| duplicate_email_or(e, |e| update_error(Entity::User, e)))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: UserId) -> Result<()> {
        let mut tx = self.db.write().begin().await?;
        let deleted = Users::new(&mut tx).delete(id).await.map_err(internal_error)?;
        if !deleted {
            return Err(Error::NotFound { entity: Entity::User });
        }
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[UserId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.db.write().begin().await?;
        Users::new(&mut tx).bulk_delete(ids).await.map_err(internal_error)?;
        tx.commit().await?;
        Ok(())
    }
}
