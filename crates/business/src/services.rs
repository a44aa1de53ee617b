//! Service context and shared result types
//!
//! Services borrow a [`ServiceContext`] for the duration of one request.

use beans_core::DEFAULT_SESSION_TTL_HOURS;
use beans_persistence::Database;
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Runtime settings for the economy rules
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    /// Admin secret. Empty disables admin login.
    pub admin_password: String,
    /// Validity window of an admin session
    pub session_ttl: Duration,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            admin_password: String::new(),
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }
}

impl EconomyConfig {
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = password.into();
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn admin_enabled(&self) -> bool {
        !self.admin_password.is_empty()
    }
}

/// Context for business operations - database access plus config
#[derive(Clone)]
pub struct ServiceContext {
    db: Database,
    config: Arc<EconomyConfig>,
}

impl ServiceContext {
    pub fn new(db: Database, config: EconomyConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }
}

/// Outcome of a successful balance mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub player_id: String,
    /// Balance after the change
    pub beans: i64,
    /// Signed delta, equal to the logged transaction amount
    pub delta: i64,
    pub transaction_id: i64,
}
