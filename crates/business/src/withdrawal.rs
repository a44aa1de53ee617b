//! Withdrawals to an external account
//!
//! The balance check is part of the UPDATE itself (`WHERE beans >= amount`),
//! so racing withdrawals cannot overdraw.

use crate::error::{BusinessError, BusinessResult};
use crate::services::{BalanceChange, ServiceContext};
use beans_core::{validate_player_id, validate_withdraw_amount, Transaction, TransactionType};
use beans_persistence::{PlayerRepo, TransactionRepo};
use chrono::Utc;

pub struct WithdrawalService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> WithdrawalService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Debit `amount` and log a negative `withdraw` transaction
    pub async fn withdraw(
        &self,
        player_id: &str,
        amount: i64,
        account_id: &str,
    ) -> BusinessResult<BalanceChange> {
        let player_id = validate_player_id(player_id)?;
        let amount = validate_withdraw_amount(amount)?;
        let now = Utc::now();

        let mut tx = self.ctx.pool().begin().await?;

        let Some(beans) = PlayerRepo::withdraw(&mut *tx, player_id, amount, now).await? else {
            tracing::warn!(player_id, amount, "withdrawal rejected: insufficient beans");
            return Err(BusinessError::InsufficientBeans);
        };

        let transaction_id = TransactionRepo::insert(
            &mut *tx,
            player_id,
            TransactionType::Withdraw,
            -amount,
            &Transaction::description_for_withdrawal(account_id),
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(player_id, amount, account_id, beans, "withdrawal completed");

        Ok(BalanceChange {
            player_id: player_id.to_string(),
            beans,
            delta: -amount,
            transaction_id,
        })
    }
}
