//! Repository implementations for SQLite
//!
//! Every function takes any [`SqliteExecutor`], so callers can run it
//! straight on the pool or inside an open transaction (`&mut *tx`).
//!
//! Balance mutations are single conditional `UPDATE .. RETURNING` statements.
//! Zero affected rows means the guard did not hold and nothing was written.

use crate::error::PersistenceResult;
use crate::sqlite::schema::*;
use beans_core::{AdminSession, Player, TransactionType};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteExecutor, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Player Repository
// ============================================================================

/// Repository for the players table
pub struct PlayerRepo;

impl PlayerRepo {
    /// Look up a player by id
    pub async fn get(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
    ) -> PersistenceResult<Option<PlayerRow>> {
        let row = sqlx::query_as::<_, PlayerRow>("SELECT * FROM players WHERE player_id = ?")
            .bind(player_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Insert a new player unless one with the same id exists.
    ///
    /// Returns true when this call created the row.
    pub async fn insert_if_absent(
        executor: impl SqliteExecutor<'_>,
        player: &Player,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO players
                (player_id, name, beans, total_earned, total_withdrawn, channel_joined, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(player_id) DO NOTHING
            "#,
        )
        .bind(&player.player_id)
        .bind(&player.name)
        .bind(player.beans)
        .bind(player.total_earned)
        .bind(player.total_withdrawn)
        .bind(player.channel_joined)
        .bind(player.created_at)
        .bind(player.updated_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Flip `channel_joined` and credit `reward`, only if not yet joined.
    ///
    /// Returns the new balance, or None if already joined or missing.
    pub async fn claim_channel_reward(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
        reward: i64,
        now: DateTime<Utc>,
    ) -> PersistenceResult<Option<i64>> {
        let beans = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE players
            SET channel_joined = TRUE,
                beans = beans + ?,
                total_earned = total_earned + ?,
                updated_at = ?
            WHERE player_id = ? AND channel_joined = FALSE
            RETURNING beans
            "#,
        )
        .bind(reward)
        .bind(reward)
        .bind(now)
        .bind(player_id)
        .fetch_optional(executor)
        .await?;
        Ok(beans)
    }

    /// Debit `amount`, only if the balance covers it.
    ///
    /// Returns the new balance, or None if insufficient or missing.
    pub async fn withdraw(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> PersistenceResult<Option<i64>> {
        let beans = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE players
            SET beans = beans - ?,
                total_withdrawn = total_withdrawn + ?,
                updated_at = ?
            WHERE player_id = ? AND beans >= ?
            RETURNING beans
            "#,
        )
        .bind(amount)
        .bind(amount)
        .bind(now)
        .bind(player_id)
        .bind(amount)
        .fetch_optional(executor)
        .await?;
        Ok(beans)
    }

    /// Add a signed `amount` to the balance with no floor.
    ///
    /// Returns the new balance, or None if the player does not exist.
    pub async fn adjust_balance(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> PersistenceResult<Option<i64>> {
        let beans = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE players
            SET beans = beans + ?, updated_at = ?
            WHERE player_id = ?
            RETURNING beans
            "#,
        )
        .bind(amount)
        .bind(now)
        .bind(player_id)
        .fetch_optional(executor)
        .await?;
        Ok(beans)
    }

    /// Top players by balance, ranked 1..n
    pub async fn leaderboard(
        executor: impl SqliteExecutor<'_>,
        limit: i64,
    ) -> PersistenceResult<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT player_id, name, beans,
                   ROW_NUMBER() OVER (ORDER BY beans DESC, player_id ASC) AS rank
            FROM players
            ORDER BY beans DESC, player_id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Count players
    pub async fn count(executor: impl SqliteExecutor<'_>) -> PersistenceResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM players")
            .fetch_one(executor)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Repository for the append-only transactions table
pub struct TransactionRepo;

impl TransactionRepo {
    /// Append a transaction, returning its id
    pub async fn insert(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
        tx_type: TransactionType,
        amount: i64,
        description: &str,
        now: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO transactions (player_id, type, amount, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(player_id)
        .bind(tx_type.as_str())
        .bind(amount)
        .bind(description)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Transactions for one player, newest first
    pub async fn list_for_player(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
        limit: i64,
    ) -> PersistenceResult<Vec<TransactionRow>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE player_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(player_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Sum of signed amounts for one player
    pub async fn sum_for_player(
        executor: impl SqliteExecutor<'_>,
        player_id: &str,
    ) -> PersistenceResult<i64> {
        let sum = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE player_id = ?",
        )
        .bind(player_id)
        .fetch_one(executor)
        .await?;
        Ok(sum)
    }

    /// Count transactions
    pub async fn count(executor: impl SqliteExecutor<'_>) -> PersistenceResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions")
            .fetch_one(executor)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Admin Session Repository
// ============================================================================

/// Repository for the admin_sessions table
pub struct AdminSessionRepo;

impl AdminSessionRepo {
    pub async fn insert(
        executor: impl SqliteExecutor<'_>,
        session: &AdminSession,
    ) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO admin_sessions (session_token, created_at, expires_at) VALUES (?, ?, ?)",
        )
        .bind(&session.session_token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Look up a session by token, expired or not
    pub async fn get(
        executor: impl SqliteExecutor<'_>,
        session_token: &str,
    ) -> PersistenceResult<Option<AdminSessionRow>> {
        let row = sqlx::query_as::<_, AdminSessionRow>(
            "SELECT * FROM admin_sessions WHERE session_token = ?",
        )
        .bind(session_token)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn count(executor: impl SqliteExecutor<'_>) -> PersistenceResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_sessions")
            .fetch_one(executor)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Open a connection pool for `database_url`, creating the file if needed
pub async fn create_pool(database_url: &str, max_connections: u32) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Single-connection in-memory pool. Each connection to `:memory:` is its own
/// database, so the pool must never open a second one or drop the first.
pub async fn create_memory_pool() -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Apply migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Open a pool and bring the schema up to date
pub async fn init_database(database_url: &str, max_connections: u32) -> PersistenceResult<SqlitePool> {
    let pool = create_pool(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    tracing::debug!(database_url, "database ready");
    Ok(pool)
}
