//! # astrocat: data access for the Astro Cat membership platform
//!
//! `astrocat` is the persistence layer behind a gym and community membership app. It stores
//! users and their onboarding profile, the catalog (communities, plans, services, locals,
//! professionals and the associations between them), scheduled sessions and reservations,
//! memberships with their suspensions, and an append-only audit trail.
//!
//! ## Layers
//!
//! - [`db`] holds one repository per table. Repositories borrow a single connection or
//!   transaction and speak in `*DBRequest` / `*DBResponse` models.
//! - [`adapters`] wraps the repositories with input validation, read/write pool routing,
//!   transactions for bulk operations and the mapping of database failures onto
//!   [`errors::Error`], which carries a stable `<ENTITY>_ERROR_<NNN>` code.
//!
//! Every table except the association tables and `audit_logs` is soft-deleted: rows get a
//! `deleted_at` timestamp and disappear from every read.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use astrocat::{AdapterCollection, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = astrocat::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     astrocat::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let pools = astrocat::connect(&config).await?;
//!     astrocat::migrator().run(pools.write()).await?;
//!
//!     let adapters = AdapterCollection::new(pools);
//!     let plans = adapters.plan.fetch(&[]).await?;
//!     println!("{} plans on offer", plans.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod adapters;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::AdapterCollection;
pub use config::Config;
pub use db::pools::DbPools;
pub use errors::Error;
pub use types::{
    AuditLogId, CommunityId, LocalId, MembershipId, MembershipSuspensionId, OnboardingId, PlanId, ProfessionalId,
    ReservationId, ServiceId, SessionId, UserId,
};

/// Get the astrocat database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the database pools described by `config`
pub async fn connect(config: &Config) -> anyhow::Result<DbPools> {
    DbPools::connect(&config.database, config.slow_statement_threshold()).await
}
