//! # Session Module
//!
//! Admin bearer sessions. A session is never deleted; it simply stops
//! being valid once `expires_at` is reached.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Validity window applied when no TTL is configured
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Entropy per token, before hex encoding
pub const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub session_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Session issued at `now`, valid for `ttl`
    pub fn issue(session_token: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            session_token,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Valid strictly before `expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
