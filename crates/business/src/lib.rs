//! # Beans Business
//!
//! Business logic layer - the rules that move beans.
//!
//! Every operation that writes more than one row runs in a single store
//! transaction; an early return drops the transaction and rolls it back.

pub mod admin;
pub mod error;
pub mod player;
pub mod question;
pub mod reward;
pub mod services;
pub mod withdrawal;

pub use admin::{generate_session_token, AdminGrant, AdminService};
pub use error::{BusinessError, BusinessResult, ErrorKind};
pub use player::{PlayerLookup, PlayerService};
pub use question::{QuestionService, QUESTION_ACK};
pub use reward::RewardService;
pub use services::{BalanceChange, EconomyConfig, ServiceContext};
pub use withdrawal::WithdrawalService;
