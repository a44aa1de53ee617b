//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! Schema is defined in migrations/20261019000000_init.sql

use crate::error::PersistenceError;
use beans_core::{AdminSession, LeaderboardEntry, Player, Transaction};
use chrono::{DateTime, Utc};

/// Row type for the `players` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    pub player_id: String,
    pub name: String,
    pub beans: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
    pub channel_joined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type for the `transactions` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub player_id: String,
    #[sqlx(rename = "type")]
    pub tx_type: String,
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `admin_sessions` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminSessionRow {
    pub session_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Projection row for the leaderboard query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub player_id: String,
    pub name: String,
    pub beans: i64,
    pub rank: i64,
}

// === Conversion implementations ===

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            player_id: row.player_id,
            name: row.name,
            beans: row.beans,
            total_earned: row.total_earned,
            total_withdrawn: row.total_withdrawn,
            channel_joined: row.channel_joined,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = PersistenceError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let tx_type = row
            .tx_type
            .parse()
            .map_err(|_| PersistenceError::invalid_enum("transactions.type", &row.tx_type))?;
        Ok(Self {
            id: row.id,
            player_id: row.player_id,
            tx_type,
            amount: row.amount,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

impl From<AdminSessionRow> for AdminSession {
    fn from(row: AdminSessionRow) -> Self {
        Self {
            session_token: row.session_token,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            player_id: row.player_id,
            name: row.name,
            beans: row.beans,
            rank: row.rank,
        }
    }
}
