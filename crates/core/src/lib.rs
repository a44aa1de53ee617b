//! # Beans Core
//!
//! Domain types for the beans economy. No I/O lives here.
//!
//! - [`Player`]: balance, lifetime counters and the one-time channel reward flag
//! - [`Transaction`]: append-only audit record of every balance change
//! - [`AdminSession`]: bearer token with a fixed validity window
//! - [`LeaderboardEntry`]: ranked view of players by balance

pub mod error;
pub mod player;
pub mod session;
pub mod transaction;

pub use error::{CoreError, CoreResult};
pub use player::{default_player_name, validate_player_id, LeaderboardEntry, Player};
pub use session::{AdminSession, DEFAULT_SESSION_TTL_HOURS, SESSION_TOKEN_BYTES};
pub use transaction::{Transaction, TransactionType};

/// Beans credited once for joining the channel
pub const JOIN_CHANNEL_REWARD: i64 = 50;

/// Default number of leaderboard rows
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Default number of history rows
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound for any caller-supplied list limit
pub const MAX_LIST_LIMIT: i64 = 100;

/// Clamp a caller-supplied list limit into `0..=MAX_LIST_LIMIT`.
///
/// A limit of zero (or below) yields an empty list, never more rows than asked for.
pub fn clamp_limit(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(0, MAX_LIST_LIMIT)
}

/// Check that a withdrawal amount is a positive integer.
pub fn validate_withdraw_amount(amount: i64) -> CoreResult<i64> {
    if amount <= 0 {
        return Err(CoreError::InvalidAmount(format!(
            "withdrawal amount must be positive: {}",
            amount
        )));
    }
    Ok(amount)
}
