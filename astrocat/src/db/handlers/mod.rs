//! Repository implementations for database access.
//!
//! This module provides repository structs for each table in the system.
//! Repositories follow a consistent pattern and, where the entity has a plain single-key CRUD
//! surface, implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Builds queries at runtime and binds every value
//! - Returns domain models from [`crate::db::models`]
//! - Hides soft-deleted rows from every read
//!
//! # Available Repositories
//!
//! - [`Users`], [`Onboardings`]: accounts and their onboarding profile
//! - [`Communities`], [`Plans`], [`Services`], [`Locals`], [`Professionals`]: catalog
//! - [`Sessions`], [`Reservations`]: scheduling
//! - [`Memberships`], [`MembershipSuspensions`]: subscriptions
//! - [`Associations`]: the four many-to-many association tables
//! - [`AuditLogs`]: append-only audit trail
//! - [`Reports`]: read-only aggregates for the admin dashboard
//!
//! # Common Pattern
//!
//! ```ignore
//! use astrocat::db::handlers::{Plans, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Plans::new(&mut tx);
//!
//!     let created = repo.bulk_create(&requests, "admin@example.com").await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod associations;
pub mod audit_logs;
pub mod communities;
pub mod locals;
pub mod membership_suspensions;
pub mod memberships;
pub mod onboardings;
pub mod plans;
pub mod professionals;
pub mod reports;
pub mod repository;
pub mod reservations;
pub mod services;
pub mod sessions;
pub mod users;

pub use associations::Associations;
pub use audit_logs::AuditLogs;
pub use communities::Communities;
pub use locals::Locals;
pub use membership_suspensions::MembershipSuspensions;
pub use memberships::Memberships;
pub use onboardings::Onboardings;
pub use plans::Plans;
pub use professionals::Professionals;
pub use reports::Reports;
pub use repository::Repository;
pub use reservations::Reservations;
pub use services::Services;
pub use sessions::Sessions;
pub use users::Users;
