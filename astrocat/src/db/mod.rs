//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern: one repository per table, each borrowing a
//! connection or transaction for its lifetime.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Adapters   │  (crate::adapters - validation, pool routing, error codes)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`pools`]: Primary and read-replica connection pools
//!
//! # Transactions
//!
//! Repositories accept any `&mut PgConnection`, so the caller decides the transaction
//! boundary. Multi-row writes should run on a transaction so they apply all-or-nothing:
//!
//! ```ignore
//! let mut tx = pools.write().begin().await?;
//! let mut repo = Communities::new(&mut tx);
//! repo.bulk_create(&requests, "admin@example.com").await?;
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are applied with
//! [`crate::migrator`]:
//!
//! ```ignore
//! astrocat::migrator().run(pools.write()).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
pub mod pools;
