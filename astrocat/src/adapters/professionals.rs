//! Professional adapter.

use crate::adapters::{creation_error, internal_error, update_error, validation::require_updated_by};
use crate::db::{
    handlers::{Professionals, Repository},
    models::professionals::{ProfessionalCreateDBRequest, ProfessionalDBResponse, ProfessionalUpdateDBRequest},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{Entity, ProfessionalId, abbrev_uuid};
use tracing::instrument;

#[derive(Clone)]
pub struct ProfessionalAdapter {
    db: DbPools,
}

impl ProfessionalAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(professional_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: ProfessionalId) -> Result<ProfessionalDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Professionals::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Professional,
            })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<ProfessionalDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Professionals::new(&mut conn).list(&()).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(professional_type = ?request.professional_type))]
    pub async fn create(&self, request: &ProfessionalCreateDBRequest, updated_by: &str) -> Result<ProfessionalDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Professionals::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| creation_error(Entity::Professional, e))
    }

    #[instrument(skip(self, request), fields(professional_id = %abbrev_uuid(&id)))]
    pub async fn update(
        &self,
        id: ProfessionalId,
        request: &ProfessionalUpdateDBRequest,
        updated_by: &str,
    ) -> Result<ProfessionalDBResponse> {
        require_updated_by(updated_by)?;

        let mut conn = self.db.write().acquire().await?;
        Professionals::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| update_error(Entity::Professional, e))
    }

    #[instrument(skip(self), fields(professional_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: ProfessionalId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Professionals::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                entity: Entity::Professional,
            })
        }
    }
}
