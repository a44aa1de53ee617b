//! One-time channel join reward
//!
//! The flag flip and the credit happen in one conditional UPDATE, so two
//! concurrent claims can never both succeed.

use crate::error::{BusinessError, BusinessResult};
use crate::services::{BalanceChange, ServiceContext};
use beans_core::{validate_player_id, Transaction, TransactionType, JOIN_CHANNEL_REWARD};
use beans_persistence::{PlayerRepo, TransactionRepo};
use chrono::Utc;

pub struct RewardService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RewardService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Credit the channel reward unless it was already claimed
    pub async fn join_channel(&self, player_id: &str) -> BusinessResult<BalanceChange> {
        let player_id = validate_player_id(player_id)?;
        let now = Utc::now();

        let mut tx = self.ctx.pool().begin().await?;

        let Some(beans) =
            PlayerRepo::claim_channel_reward(&mut *tx, player_id, JOIN_CHANNEL_REWARD, now).await?
        else {
            tracing::debug!(player_id, "channel reward rejected");
            return Err(BusinessError::RewardAlreadyClaimed);
        };

        let transaction_id = TransactionRepo::insert(
            &mut *tx,
            player_id,
            TransactionType::Earn,
            JOIN_CHANNEL_REWARD,
            &Transaction::description_for_reward(),
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(player_id, beans, "channel reward claimed");

        Ok(BalanceChange {
            player_id: player_id.to_string(),
            beans,
            delta: JOIN_CHANNEL_REWARD,
            transaction_id,
        })
    }
}
