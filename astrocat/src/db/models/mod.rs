//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each `*DBResponse` struct matches a live table row (soft-delete
//!   bookkeeping is not exposed)
//! - **SQLx Integration**: Responses derive `sqlx::FromRow`; enums are stored as TEXT
//! - **Partial Updates**: `*UpdateDBRequest` fields are `Option<T>` (None leaves the column
//!   unchanged). Nullable columns use `Option<Option<T>>` so they can also be cleared.
//! - **Type Safety**: Uses type aliases for IDs (UserId, PlanId, etc.)
//!
//! # Model Categories
//!
//! ## People
//!
//! - [`users`]: Accounts and roles
//! - [`onboardings`]: Identity and address details collected after sign-up
//! - [`professionals`]: Trainers and medics delivering services
//!
//! ## Catalog
//!
//! - [`communities`], [`plans`], [`services`], [`locals`]
//! - [`associations`]: Community-Plan, Community-Service, Service-Local, Service-Professional
//!
//! ## Scheduling and Subscriptions
//!
//! - [`sessions`], [`reservations`]
//! - [`memberships`]: Memberships and their suspensions
//!
//! ## Compliance
//!
//! - [`audit_logs`]: Append-only audit trail
//! - [`reports`]: Community and service report aggregates

pub mod associations;
pub mod audit_logs;
pub mod communities;
pub mod locals;
pub mod memberships;
pub mod onboardings;
pub mod plans;
pub mod professionals;
pub mod reports;
pub mod reservations;
pub mod services;
pub mod sessions;
pub mod users;
