//! Admin session gate and balance adjustments
//!
//! Login trades the configured secret for a random bearer token. Privileged
//! operations take an [`AdminGrant`], which only [`AdminService::authorize`]
//! can hand out, so the token is looked up once per request.

use crate::error::{BusinessError, BusinessResult};
use crate::services::{BalanceChange, ServiceContext};
use beans_core::{
    validate_player_id, AdminSession, Transaction, TransactionType, SESSION_TOKEN_BYTES,
};
use beans_persistence::{AdminSessionRepo, PlayerRepo, TransactionRepo};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

/// 32 bytes from the OS RNG, hex encoded (URL safe)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A verified admin session for the current request
#[derive(Debug)]
pub struct AdminGrant {
    _private: (),
}

pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a session if `password` matches the configured secret
    pub async fn login(&self, password: &str) -> BusinessResult<AdminSession> {
        let config = self.ctx.config();
        if !config.admin_enabled() || password != config.admin_password {
            tracing::warn!("admin login rejected");
            return Err(BusinessError::InvalidPassword);
        }

        let session = AdminSession::issue(generate_session_token(), Utc::now(), config.session_ttl);
        AdminSessionRepo::insert(self.ctx.pool(), &session).await?;

        tracing::info!(expires_at = %session.expires_at, "admin session issued");
        Ok(session)
    }

    /// True iff `token` names a session that has not expired
    pub async fn verify(&self, token: Option<&str>) -> BusinessResult<bool> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };

        let valid = AdminSessionRepo::get(self.ctx.pool(), token)
            .await?
            .map(AdminSession::from)
            .is_some_and(|session| session.is_valid_at(Utc::now()));
        Ok(valid)
    }

    /// Turn a live session token into a grant, or fail with `AccessDenied`
    pub async fn authorize(&self, token: Option<&str>) -> BusinessResult<AdminGrant> {
        if !self.verify(token).await? {
            tracing::warn!("admin authorization denied");
            return Err(BusinessError::AccessDenied);
        }
        Ok(AdminGrant { _private: () })
    }

    /// Add a signed `amount` to the target's balance. No floor is applied,
    /// so a negative amount can take the balance below zero.
    pub async fn update_balance(
        &self,
        _grant: &AdminGrant,
        target_player_id: &str,
        amount: i64,
    ) -> BusinessResult<BalanceChange> {
        let target_player_id = validate_player_id(target_player_id)?;
        let now = Utc::now();
        let mut tx = self.ctx.pool().begin().await?;

        let Some(beans) = PlayerRepo::adjust_balance(&mut *tx, target_player_id, amount, now).await?
        else {
            return Err(BusinessError::PlayerNotFound(target_player_id.to_string()));
        };

        let transaction_id = TransactionRepo::insert(
            &mut *tx,
            target_player_id,
            TransactionType::Admin,
            amount,
            &Transaction::description_for_admin(),
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(target_player_id, amount, beans, "admin balance update");

        Ok(BalanceChange {
            player_id: target_player_id.to_string(),
            beans,
            delta: amount,
            transaction_id,
        })
    }
}
