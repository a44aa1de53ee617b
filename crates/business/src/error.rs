//! Business layer errors
//!
//! Every variant maps to one [`ErrorKind`], which the HTTP layer turns
//! into a status code.

use beans_core::CoreError;
use beans_persistence::PersistenceError;
use thiserror::Error;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Business rule or input rejected (400)
    Validation,
    /// Bad credentials or missing/expired session (401)
    Unauthorized,
    /// Target entity missing (404)
    NotFound,
    /// Store or runtime failure (500)
    Internal,
}

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Rule violations ===
    #[error("Reward already claimed")]
    RewardAlreadyClaimed,

    #[error("Insufficient beans")]
    InsufficientBeans,

    #[error(transparent)]
    Core(#[from] CoreError),

    // === Auth errors ===
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Access denied")]
    AccessDenied,

    // === Not found errors ===
    #[error("Player not found")]
    PlayerNotFound(String),

    // === Wrapped errors ===
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<sqlx::Error> for BusinessError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.into())
    }
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RewardAlreadyClaimed | Self::InsufficientBeans | Self::Core(_) => {
                ErrorKind::Validation
            }
            Self::InvalidPassword | Self::AccessDenied => ErrorKind::Unauthorized,
            Self::PlayerNotFound(_) => ErrorKind::NotFound,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }
}
