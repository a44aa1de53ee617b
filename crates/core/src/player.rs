//! # Player Module
//!
//! Player record and leaderboard view.
//!
//! A player is identified by an opaque external id handed to us by the
//! client. Records are created lazily on first lookup with a zero balance.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of id characters used in the generated display name
const NAME_ID_PREFIX_LEN: usize = 6;

/// Longest player id we accept from a client
pub const MAX_PLAYER_ID_LEN: usize = 128;

/// A player's balance and lifetime counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub name: String,
    /// Current balance
    pub beans: i64,
    /// Lifetime credits from rewards
    pub total_earned: i64,
    /// Lifetime debits from withdrawals
    pub total_withdrawn: i64,
    /// One-way flag: false until the channel reward is claimed
    pub channel_joined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// New player with zero balance and a generated name
    pub fn new(player_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            player_id: player_id.to_string(),
            name: default_player_name(player_id),
            beans: 0,
            total_earned: 0,
            total_withdrawn: 0,
            channel_joined: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {} beans", self.name, self.player_id, self.beans)
    }
}

/// Display name for a freshly registered player: `Player #<first 6 chars>`.
///
/// Counts characters, not bytes, so multi-byte ids never split a code point.
pub fn default_player_name(player_id: &str) -> String {
    let prefix: String = player_id.chars().take(NAME_ID_PREFIX_LEN).collect();
    format!("Player #{}", prefix)
}

/// Reject empty or oversized ids before they reach the store.
pub fn validate_player_id(player_id: &str) -> CoreResult<&str> {
    let trimmed = player_id.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidPlayerId("empty".to_string()));
    }
    if trimmed.len() > MAX_PLAYER_ID_LEN {
        return Err(CoreError::InvalidPlayerId(format!(
            "longer than {} bytes",
            MAX_PLAYER_ID_LEN
        )));
    }
    Ok(trimmed)
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub name: String,
    pub beans: i64,
    /// 1-based position, ascending with no gaps
    pub rank: i64,
}
