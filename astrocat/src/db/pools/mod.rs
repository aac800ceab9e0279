//! Database pool abstraction supporting read replicas.
//!
//! [`DbPools`] wraps the primary pool and an optional replica. Adapters route:
//! - `.read()` for Get/Fetch style lookups (uses replica if available)
//! - `.write()` for every mutation and for transactions (always primary)
//!
//! `DbPools` implements `Deref<Target = PgPool>`, so `db.begin()` and `&*db` reach the
//! primary.

use crate::config::{DatabaseConfig, PoolSettings};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database pool abstraction supporting read replicas.
#[derive(Clone, Debug)]
pub struct DbPools {
    primary: PgPool,
    replica: Option<PgPool>,
}

impl DbPools {
    /// Create a new DbPools with only a primary pool.
    pub fn new(primary: PgPool) -> Self {
        Self { primary, replica: None }
    }

    /// Create a new DbPools with primary and replica pools.
    pub fn with_replica(primary: PgPool, replica: PgPool) -> Self {
        Self {
            primary,
            replica: Some(replica),
        }
    }

    /// Connect the primary (and replica, if configured) pools.
    ///
    /// Statements slower than `slow_statement_threshold` are logged at WARN.
    pub async fn connect(config: &DatabaseConfig, slow_statement_threshold: Duration) -> anyhow::Result<Self> {
        info!("Connecting to primary database");
        let primary = build_pool(&config.url, &config.pool, slow_statement_threshold).await?;

        let replica = match &config.replica_url {
            Some(url) => {
                info!("Connecting to read replica");
                let settings = config.replica_pool.as_ref().unwrap_or(&config.pool);
                Some(build_pool(url, settings, slow_statement_threshold).await?)
            }
            None => None,
        };

        Ok(Self { primary, replica })
    }

    /// Get a pool for read-only operations.
    ///
    /// Returns the replica pool if configured, otherwise falls back to primary.
    /// Use this for lookups that can tolerate slight staleness.
    pub fn read(&self) -> &PgPool {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get a pool for write operations or reads requiring strong consistency.
    pub fn write(&self) -> &PgPool {
        &self.primary
    }

    /// Check if a replica pool is configured.
    pub fn has_replica(&self) -> bool {
        self.replica.is_some()
    }

    /// Close all database connections.
    pub async fn close(&self) {
        self.primary.close().await;
        if let Some(replica) = &self.replica {
            replica.close().await;
        }
    }
}

/// Dereferences to the primary pool.
impl Deref for DbPools {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.primary
    }
}

async fn build_pool(url: &str, settings: &PoolSettings, slow_statement_threshold: Duration) -> anyhow::Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(url)?.log_slow_statements(log::LevelFilter::Warn, slow_statement_threshold);

    let mut options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

    // 0 means "never" for both timeouts
    options = options.idle_timeout((settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs)));
    options = options.max_lifetime((settings.max_lifetime_secs > 0).then(|| Duration::from_secs(settings.max_lifetime_secs)));

    Ok(options.connect_with(connect_options).await?)
}
