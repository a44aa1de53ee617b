//! # Beans Persistence
//!
//! SQLite storage for players, transactions and admin sessions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use beans_persistence::{Database, PlayerRepo};
//!
//! let db = Database::connect("sqlite:data/beans.db?mode=rwc", 5).await?;
//!
//! // Reads go straight to the pool
//! let top = PlayerRepo::leaderboard(db.pool(), 10).await?;
//!
//! // Writes that must land together share one transaction
//! let mut tx = db.pool().begin().await?;
//! PlayerRepo::withdraw(&mut *tx, "p1", 30, now).await?;
//! TransactionRepo::insert(&mut *tx, "p1", TransactionType::Withdraw, -30, "..", now).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::{
    create_memory_pool, create_pool, init_database, run_migrations, AdminSessionRepo, PlayerRepo,
    TransactionRepo,
};
pub use sqlite::schema::{AdminSessionRow, LeaderboardRow, PlayerRow, TransactionRow};

use sqlx::SqlitePool;

/// Database facade over the SQLite pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g., "sqlite:data/beans.db?mode=rwc")
    /// * `max_connections` - pool size
    pub async fn connect(db_url: &str, max_connections: u32) -> PersistenceResult<Self> {
        let pool = init_database(db_url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema applied
    pub async fn in_memory() -> PersistenceResult<Self> {
        let pool = create_memory_pool().await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
