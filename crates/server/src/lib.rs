//! # Beans Server
//!
//! HTTP API for the beans economy: axum router, request dispatch,
//! configuration and error rendering.

pub mod api;
pub mod config;
pub mod error;

pub use api::router;
pub use config::Cli;
pub use error::{ApiError, ApiResult};
