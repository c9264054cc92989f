use std::sync::Arc;

use crate::config::Config;
use crate::db::{ConnectionProvider, Lease};
use crate::error::AppResult;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pool-backed connection provider
    pub pool: ConnectionProvider,
    /// Application configuration (read-only after boot)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(pool: ConnectionProvider, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Lease a connection for the current request
    pub fn lease(&self) -> AppResult<Lease> {
        self.pool.acquire()
    }
}
