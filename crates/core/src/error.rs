//! # Error Module
//!
//! Domain errors for the beans economy, built with thiserror.

use thiserror::Error;

/// Core domain errors.
///
/// Pure validation failures, unrelated to storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid player id: {0}")]
    InvalidPlayerId(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
