//! Onboarding adapter. A user has at most one live onboarding profile.

use crate::adapters::{creation_error, internal_error, update_error, validation::require_updated_by};
use crate::db::{
    handlers::{Onboardings, Repository, onboardings::USER_UNIQUE_CONSTRAINT},
    models::onboardings::{OnboardingCreateDBRequest, OnboardingDBResponse, OnboardingUpdateDBRequest},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, OnboardingId, UserId, abbrev_uuid};
use tracing::instrument;

#[derive(Clone)]
pub struct OnboardingAdapter {
    db: DbPools,
}

impl OnboardingAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(onboarding_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: OnboardingId) -> Result<OnboardingDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Onboardings::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Onboarding,
            })
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)))]
    pub async fn get_by_user(&self, user_id: UserId) -> Result<OnboardingDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Onboardings::new(&mut conn)
            .get_by_user(user_id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Onboarding,
            })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<OnboardingDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Onboardings::new(&mut conn).list(&()).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)))]
    pub async fn create(&self, request: &OnboardingCreateDBRequest, updated_by: &str) -> Result<OnboardingDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Onboardings::new(&mut conn).create(request, updated_by).await.map_err(|e| {
            if e.is_unique_violation_on(USER_UNIQUE_CONSTRAINT) {
                Error::AlreadyOnboarded
            } else {
                creation_error(Entity::Onboarding, e)
            }
        })
    }

    #[instrument(skip(self, request), fields(onboarding_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: OnboardingId, request: &OnboardingUpdateDBRequest, updated_by: &str) -> Result<OnboardingDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Onboardings::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Onboarding, e))
    }

    #[instrument(skip(self), fields(onboarding_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: OnboardingId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Onboardings::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                entity: Entity::Onboarding,
            })
        }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)))]
    pub async fn delete_by_user(&self, user_id: UserId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Onboardings::new(&mut conn).delete_by_user(user_id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                entity: Entity::Onboarding,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::onboardings::DocumentType;
    use crate::test_utils::{TEST_ACTOR, create_test_adapters, create_test_user, onboarding_request};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_one_onboarding_per_user(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let adapters = create_test_adapters(pool);

        let created = adapters
            .onboarding
            .create(&onboarding_request(user.id), TEST_ACTOR)
            .await
            .unwrap();
        assert_eq!(adapters.onboarding.get(created.id).await.unwrap(), created);
        assert_eq!(adapters.onboarding.get_by_user(user.id).await.unwrap(), created);

        let err = adapters
            .onboarding
            .create(&onboarding_request(user.id), TEST_ACTOR)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyOnboarded));
        assert_eq!(err.code(), "ONBOARDING_ERROR_006");

        // After removal the user may onboard again
        adapters.onboarding.delete_by_user(user.id).await.unwrap();
        adapters
            .onboarding
            .create(&onboarding_request(user.id), TEST_ACTOR)
            .await
            .unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let adapters = create_test_adapters(pool);

        assert!(matches!(
            adapters.onboarding.create(&onboarding_request(user.id), "").await,
            Err(Error::InvalidUpdatedByValue)
        ));

        let created = adapters
            .onboarding
            .create(&onboarding_request(user.id), TEST_ACTOR)
            .await
            .unwrap();

        let update = OnboardingUpdateDBRequest {
            document_type: Some(DocumentType::ForeignerCard),
            document_number: Some("001234567".to_string()),
            ..Default::default()
        };
        let updated = adapters.onboarding.update(created.id, &update, "editor").await.unwrap();
        assert_eq!(updated.document_type, DocumentType::ForeignerCard);
        assert_eq!(updated.district, created.district);

        assert_eq!(adapters.onboarding.fetch().await.unwrap().len(), 1);

        adapters.onboarding.delete(created.id).await.unwrap();
        assert!(matches!(
            adapters.onboarding.delete(created.id).await,
            Err(Error::NotFound {
                entity: Entity::Onboarding
            })
        ));
        assert!(matches!(
            adapters.onboarding.delete_by_user(user.id).await,
            Err(Error::NotFound {
                entity: Entity::Onboarding
            })
        ));
        assert!(adapters.onboarding.fetch().await.unwrap().is_empty());
    }
}
