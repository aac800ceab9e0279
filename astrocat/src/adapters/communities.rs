//! Community adapter.
//!
//! Community names are unique among live communities. A clash is reported as
//! [`Error::DuplicateName`] rather than the generic `NotCreated`.

use crate::adapters::{
    creation_error, internal_error, update_error,
    validation::{require_name, require_updated_by},
};
use crate::db::{
    errors::DbError,
    handlers::{Communities, Reports, Repository, communities::NAME_UNIQUE_CONSTRAINT},
    models::{
        communities::{CommunityCreateDBRequest, CommunityDBResponse, CommunityUpdateDBRequest},
        reports::{CommunityReport, ReportParams},
    },
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::{CommunityId, Entity, abbrev_uuid};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct CommunityAdapter {
    db: DbPools,
}

fn duplicate_name_or(err: DbError, fallback: impl FnOnce(DbError) -> Error) -> Error {
    if err.is_unique_violation_on(NAME_UNIQUE_CONSTRAINT) {
        debug!("Community name already taken");
        Error::DuplicateName {
            entity: Entity::Community,
        }
    } else {
        fallback(err)
    }
}

impl CommunityAdapter {
    pub fn new(db: DbPools) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(community_id = %abbrev_uuid(&id)))]
    pub async fn get(&self, id: CommunityId) -> Result<CommunityDBResponse> {
        let mut conn = self.db.read().acquire().await?;
        Communities::new(&mut conn)
            .get_by_id(id)
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound {
                entity: Entity::Community,
            })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<CommunityDBResponse>> {
        let mut conn = self.db.read().acquire().await?;
        Communities::new(&mut conn).list(&()).await.map_err(internal_error)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: &CommunityCreateDBRequest, updated_by: &str) -> Result<CommunityDBResponse> {
        require_updated_by(updated_by)?;
        require_name(Entity::Community, &request.name)?;

        let mut conn = self.db.write().acquire().await?;
        Communities::new(&mut conn)
            .create(request, updated_by)
            .await
            .map_err(|e| duplicate_name_or(e, |e| creation_error(Entity::Community, e)))
    }

    /// Create every community or none; an empty batch is a no-op
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn bulk_create(&self, requests: &[CommunityCreateDBRequest], updated_by: &str) -> Result<Vec<CommunityDBResponse>> {
        require_updated_by(updated_by)?;
        for request in requests {
            require_name(Entity::Community, &request.name)?;
        }
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.write().begin().await?;
        let communities = Communities::new(&mut tx)
            .bulk_create(requests, updated_by)
            .await
            .map_err(|e| duplicate_name_or(e, |e| creation_error(Entity::Community, e)))?;
        tx.commit().await?;

        Ok(communities)
    }

    #[instrument(skip(self, request), fields(community_id = %abbrev_uuid(&id)))]
    pub async fn update(&self, id: CommunityId, request: &CommunityUpdateDBRequest, updated_by: &str) -> Result<CommunityDBResponse> {
        require_updated_by(updated_by)?;
        if let Some(name) = &request.name {
            require_name(Entity::Community, name)?;
        }

        let mut conn = self.db.write().acquire().await?;
        Communities::new(&mut conn)
            .update(id, request, updated_by)
            .await
            .map_err(|e| duplicate_name_or(e, |e| update_error(Entity::Community, e)))
    }

    #[instrument(skip(self), fields(community_id = %abbrev_uuid(&id)))]
    pub async fn delete(&self, id: CommunityId) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        if Communities::new(&mut conn).delete(id).await.map_err(internal_error)? {
            Ok(())
        } else {
            Err(Error::NotFound {
                entity: Entity::Community,
            })
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[CommunityId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.write().acquire().await?;
        Communities::new(&mut conn).bulk_delete(ids).await.map_err(internal_error)?;
        Ok(())
    }

    /// Membership and engagement figures per community over `params`' window
    #[instrument(skip(self))]
    pub async fn get_report(&self, params: &ReportParams) -> Result<CommunityReport> {
        let mut conn = self.db.read().acquire().await?;
        Reports::new(&mut conn).community_report(params).await.map_err(internal_error)
    }
}
