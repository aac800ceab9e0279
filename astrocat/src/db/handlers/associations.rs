//! Database repository for the many-to-many association tables.
//!
//! One generic repository serves every [`Association`] kind: the table and column names come
//! from the kind's constants, so queries are assembled per kind and values are always bound.
//! Associations are keyed by their parent pair and removed physically.

use crate::db::{
    errors::Result,
    models::associations::{Association, AssociationPair},
};
use crate::types::abbrev_uuid;
use sqlx::PgConnection;
use std::marker::PhantomData;
use tracing::instrument;
use uuid::Uuid;

pub struct Associations<'c, A: Association> {
    db: &'c mut PgConnection,
    _kind: PhantomData<A>,
}

impl<'c, A: Association> Associations<'c, A> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db, _kind: PhantomData }
    }

    #[instrument(
        skip(self, pair),
        fields(table = A::TABLE, left_id = %abbrev_uuid(&pair.left_id), right_id = %abbrev_uuid(&pair.right_id)),
        err
    )]
    pub async fn create(&mut self, pair: AssociationPair, updated_by: &str) -> Result<A> {
        let sql = format!(
            "INSERT INTO {} (id, {}, {}, updated_by) VALUES ($1, $2, $3, $4) RETURNING *",
            A::TABLE,
            A::LEFT_COLUMN,
            A::RIGHT_COLUMN
        );

        let association = sqlx::query_as::<_, A>(&sql)
            .bind(Uuid::new_v4())
            .bind(pair.left_id)
            .bind(pair.right_id)
            .bind(updated_by)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(association)
    }

    /// Create several associations, returning them in input order.
    ///
    /// Run this on a transaction if the batch must be all-or-nothing.
    #[instrument(skip(self, pairs), fields(table = A::TABLE, count = pairs.len()), err)]
    pub async fn bulk_create(&mut self, pairs: &[AssociationPair], updated_by: &str) -> Result<Vec<A>> {
        let mut created = Vec::with_capacity(pairs.len());
        for pair in pairs {
            created.push(self.create(*pair, updated_by).await?);
        }
        Ok(created)
    }

    #[instrument(
        skip(self, pair),
        fields(table = A::TABLE, left_id = %abbrev_uuid(&pair.left_id), right_id = %abbrev_uuid(&pair.right_id)),
        err
    )]
    pub async fn get(&mut self, pair: AssociationPair) -> Result<Option<A>> {
        let sql = format!("SELECT * FROM {} WHERE {} = $1 AND {} = $2", A::TABLE, A::LEFT_COLUMN, A::RIGHT_COLUMN);

        let association = sqlx::query_as::<_, A>(&sql)
            .bind(pair.left_id)
            .bind(pair.right_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(association)
    }

    #[instrument(skip(self), fields(table = A::TABLE), err)]
    pub async fn list(&mut self) -> Result<Vec<A>> {
        let sql = format!("SELECT * FROM {} ORDER BY created_at, id", A::TABLE);

        let associations = sqlx::query_as::<_, A>(&sql).fetch_all(&mut *self.db).await?;

        Ok(associations)
    }

    /// Every association whose left parent is `left_id`, e.g. the plans of one community
    #[instrument(skip(self), fields(table = A::TABLE, left_id = %abbrev_uuid(&left_id)), err)]
    pub async fn list_by_left(&mut self, left_id: Uuid) -> Result<Vec<A>> {
        let sql = format!("SELECT * FROM {} WHERE {} = $1 ORDER BY created_at, id", A::TABLE, A::LEFT_COLUMN);

        let associations = sqlx::query_as::<_, A>(&sql).bind(left_id).fetch_all(&mut *self.db).await?;

        Ok(associations)
    }

    #[instrument(
        skip(self, pair),
        fields(table = A::TABLE, left_id = %abbrev_uuid(&pair.left_id), right_id = %abbrev_uuid(&pair.right_id)),
        err
    )]
    pub async fn delete(&mut self, pair: AssociationPair) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = $1 AND {} = $2", A::TABLE, A::LEFT_COLUMN, A::RIGHT_COLUMN);

        let result = sqlx::query(&sql)
            .bind(pair.left_id)
            .bind(pair.right_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every listed pair in one statement, returning how many rows went
    #[instrument(skip(self, pairs), fields(table = A::TABLE, count = pairs.len()), err)]
    pub async fn bulk_delete(&mut self, pairs: &[AssociationPair]) -> Result<u64> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let (left_ids, right_ids): (Vec<Uuid>, Vec<Uuid>) = pairs.iter().map(|p| (p.left_id, p.right_id)).unzip();

        let sql = format!(
            "DELETE FROM {} WHERE ({}, {}) IN (SELECT * FROM UNNEST($1::uuid[], $2::uuid[]))",
            A::TABLE,
            A::LEFT_COLUMN,
            A::RIGHT_COLUMN
        );

        let result = sqlx::query(&sql)
            .bind(&left_ids)
            .bind(&right_ids)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
