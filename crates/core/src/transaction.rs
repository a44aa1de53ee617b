//! # Transaction Module
//!
//! Append-only audit records. The sum of a player's transaction amounts
//! reconstructs their balance independently of `Player::beans`.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Reward credit
    Earn,
    /// Payout to an external account, recorded as a negative amount
    Withdraw,
    /// Manual adjustment by an administrator, either sign
    Admin,
}

impl TransactionType {
    /// Code string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Earn => "earn",
            TransactionType::Withdraw => "withdraw",
            TransactionType::Admin => "admin",
        }
    }
}

impl FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earn" => Ok(TransactionType::Earn),
            "withdraw" => Ok(TransactionType::Withdraw),
            "admin" => Ok(TransactionType::Admin),
            other => Err(CoreError::UnknownTransactionType(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub player_id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Signed balance delta
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn description_for_reward() -> String {
        "Channel join reward".to_string()
    }

    pub fn description_for_withdrawal(account_id: &str) -> String {
        format!("Withdrawal to account {}", account_id)
    }

    pub fn description_for_admin() -> String {
        "Admin adjustment".to_string()
    }
}
