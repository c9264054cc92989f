//! Connection provider
//!
//! Wraps the sea-orm pool and hands each request a scoped [`Lease`]. The
//! lease is released when it is dropped, which covers normal returns, `?`
//! propagation and early returns alike.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use serde::Serialize;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::AppResult;

/// Lease counters shared by a provider and its leases
#[derive(Debug, Default)]
pub struct PoolStats {
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub acquired: u64,
    pub released: u64,
    pub in_use: u64,
}

impl PoolStats {
    pub fn snapshot(&self) -> PoolSnapshot {
        let released = self.released.load(Ordering::SeqCst);
        let acquired = self.acquired.load(Ordering::SeqCst);
        PoolSnapshot {
            acquired,
            released,
            in_use: acquired.saturating_sub(released),
        }
    }
}

/// Pool-backed connection provider
#[derive(Clone)]
pub struct ConnectionProvider {
    db: Arc<DatabaseConnection>,
    stats: Arc<PoolStats>,
}

impl ConnectionProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::shared(Arc::new(db))
    }

    /// Wrap a handle the caller keeps too (tests read the mock's log through it)
    pub fn shared(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Open the pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        info!("Connecting to database: {}", config.display_target());

        let mut opt = ConnectOptions::new(config.connection_url());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .sqlx_logging(config.sqlx_logging)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        let db = Database::connect(opt).await?;
        info!("Database connection established");

        Ok(Self::new(db))
    }

    /// Lease a connection for the duration of one handler
    pub fn acquire(&self) -> AppResult<Lease> {
        if matches!(*self.db, DatabaseConnection::Disconnected) {
            return Err(DbErr::Conn(RuntimeErr::Internal(
                "connection pool is not available".to_string(),
            ))
            .into());
        }

        let acquired = self.stats.acquired.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(acquired, "connection leased");

        Ok(Lease {
            conn: self.db.clone(),
            stats: self.stats.clone(),
        })
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        self.stats.clone()
    }
}

/// Request-scoped handle on the pool; released exactly once on drop
///
/// This is a guard around the shared pool handle, not a checked-out sqlx
/// connection: sea-orm takes a pooled connection per statement. [`PoolStats`]
/// therefore counts leases, not sqlx checkouts.
pub struct Lease {
    conn: Arc<DatabaseConnection>,
    stats: Arc<PoolStats>,
}

impl Deref for Lease {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let released = self.stats.released.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(released, "connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_provider() -> ConnectionProvider {
        ConnectionProvider::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[test]
    fn lease_is_released_on_drop() {
        let provider = mock_provider();
        let stats = provider.stats();

        {
            let _lease = provider.acquire().unwrap();
            assert_eq!(stats.snapshot().in_use, 1);
        }

        let snap = stats.snapshot();
        assert_eq!(snap.acquired, 1);
        assert_eq!(snap.released, 1);
        assert_eq!(snap.in_use, 0);
    }

    #[test]
    fn lease_is_released_on_early_error_return() {
        fn fails(provider: &ConnectionProvider) -> AppResult<()> {
            let _lease = provider.acquire()?;
            Err(AppError::NotFound("nothing".to_string()))
        }

        let provider = mock_provider();
        assert!(fails(&provider).is_err());
        assert!(fails(&provider).is_err());

        let snap = provider.stats().snapshot();
        assert_eq!(snap.acquired, 2);
        assert_eq!(snap.released, 2);
    }

    #[test]
    fn leases_share_one_connection_handle() {
        let conn = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let provider = ConnectionProvider::shared(conn.clone());
        let cloned = provider.clone();

        let first = provider.acquire().unwrap();
        let second = cloned.acquire().unwrap();
        assert!(std::ptr::eq(&*first, conn.as_ref()));
        assert!(std::ptr::eq(&*second, conn.as_ref()));

        // counters track guards, both over the same pool handle
        assert_eq!(provider.stats().snapshot().in_use, 2);
        drop(first);
        drop(second);
        assert_eq!(cloned.stats().snapshot().in_use, 0);
    }

    #[test]
    fn disconnected_provider_fails_to_acquire() {
        let provider = ConnectionProvider::new(DatabaseConnection::Disconnected);
        let result = provider.acquire();
        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(provider.stats().snapshot().acquired, 0);
    }
}
