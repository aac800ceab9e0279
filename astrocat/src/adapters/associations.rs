//! Adapter for the many-to-many associations.
//!
//! One generic adapter serves every [`Association`] kind; the collection exposes an instance
//! per kind (`community_plan`, `service_local`, ...). Associations are addressed by their pair
//! of parent ids and deleted physically.

use crate::adapters::{
    creation_error, internal_error,
    validation::{require_pairs, require_updated_by},
};
use crate::db::{
    handlers::Associations,
    models::associations::{Association, AssociationPair},
    pools::DbPools,
};
use crate::errors::{Error, Result};
use crate::types::abbrev_uuid;
use std::marker::PhantomData;
use tracing::instrument;
use uuid::Uuid;

pub struct AssociationAdapter<A: Association> {
    db: DbPools,
    _kind: PhantomData<fn() -> A>,
}

impl<A: Association> Clone for AssociationAdapter<A> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<A: Association> AssociationAdapter<A> {
    pub fn new(db: DbPools) -> Self {
        Self { db, _kind: PhantomData }
    }

    #[instrument(skip(self), fields(table = A::TABLE, left_id = %abbrev_uuid(&left_id), right_id = %abbrev_uuid(&right_id)))]
    pub async fn create(&self, left_id: Uuid, right_id: Uuid, updated_by: &str) -> Result<A> {
        require_updated_by(updated_by)?;
        let pair = AssociationPair::new(left_id, right_id);
        require_pairs(A::ENTITY, &[pair])?;

        let mut conn = self.db.write().acquire().await?;
        Associations::<A>::new(&mut conn)
            .create(pair, updated_by)
            .await
            .map_err(|e| creation_error(A::ENTITY, e))
    }

    /// Create every pair or none; an empty batch is a no-op
    #[instrument(skip(self, pairs), fields(table = A::TABLE, count = pairs.len()))]
    pub async fn bulk_create(&self, pairs: &[AssociationPair], updated_by: &str) -> Result<Vec<A>> {
        require_updated_by(updated_by)?;
        require_pairs(A::ENTITY, pairs)?;
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.write().begin().await?;
        let created = Associations::<A>::new(&mut tx)
            .bulk_create(pairs, updated_by)
            .await
            .map_err(|e| creation_error(A::ENTITY, e))?;
        tx.commit().await?;

        Ok(created)
    }

    #[instrument(skip(self), fields(table = A::TABLE, left_id = %abbrev_uuid(&left_id), right_id = %abbrev_uuid(&right_id)))]
    pub async fn get(&self, left_id: Uuid, right_id: Uuid) -> Result<A> {
        let mut conn = self.db.read().acquire().await?;
        Associations::<A>::new(&mut conn)
            .get(AssociationPair::new(left_id, right_id))
            .await
            .map_err(internal_error)?
            .ok_or(Error::NotFound { entity: A::ENTITY })
    }

    #[instrument(skip(self), fields(table = A::TABLE))]
    pub async fn fetch(&self) -> Result<Vec<A>> {
        let mut conn = self.db.read().acquire().await?;
        Associations::<A>::new(&mut conn).list().await.map_err(internal_error)
    }

    /// Associations hanging off one left parent, e.g. the plans of a community
    #[instrument(skip(self), fields(table = A::TABLE, left_id = %abbrev_uuid(&left_id)))]
    pub async fn list_by_left(&self, left_id: Uuid) -> Result<Vec<A>> {
        let mut conn = self.db.read().acquire().await?;
        Associations::<A>::new(&mut conn).list_by_left(left_id).await.map_err(internal_error)
    }

    #[instrument(skip(self), fields(table = A::TABLE, left_id = %abbrev_uuid(&left_id), right_id = %abbrev_uuid(&right_id)))]
    pub async fn delete(&self, left_id: Uuid, right_id: Uuid) -> Result<()> {
        let mut conn = self.db.write().acquire().await?;
        let deleted = Associations::<A>::new(&mut conn)
            .delete(AssociationPair::new(left_id, right_id))
            .await
            .map_err(internal_error)?;

        if deleted { Ok(()) } else { Err(Error::NotFound { entity: A::ENTITY }) }
    }

    /// Delete every listed pair. A pair with a nil id rejects the whole batch.
    #[instrument(skip(self, pairs), fields(table = A::TABLE, count = pairs.len()))]
    pub async fn bulk_delete(&self, pairs: &[AssociationPair]) -> Result<()> {
        require_pairs(A::ENTITY, pairs)?;
        if pairs.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.write().acquire().await?;
        Associations::<A>::new(&mut conn).bulk_delete(pairs).await.map_err(internal_error)?;
        Ok(())
    }
}
