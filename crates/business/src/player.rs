//! Player ledger reads - lazy registration, leaderboard, history

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use beans_core::{
    clamp_limit, validate_player_id, LeaderboardEntry, Player, Transaction,
    DEFAULT_HISTORY_LIMIT, DEFAULT_LEADERBOARD_LIMIT,
};
use beans_persistence::{PlayerRepo, TransactionRepo};
use chrono::Utc;

/// Result of [`PlayerService::get_or_create`]
#[derive(Debug, Clone)]
pub struct PlayerLookup {
    pub player: Player,
    /// True when this call registered the player
    pub created: bool,
}

pub struct PlayerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PlayerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the player, registering them with zero beans on first sight
    pub async fn get_or_create(&self, player_id: &str) -> BusinessResult<PlayerLookup> {
        let player_id = validate_player_id(player_id)?;

        let mut tx = self.ctx.pool().begin().await?;
        let created = PlayerRepo::insert_if_absent(&mut *tx, &Player::new(player_id, Utc::now())).await?;
        let row = PlayerRepo::get(&mut *tx, player_id)
            .await?
            .ok_or_else(|| BusinessError::PlayerNotFound(player_id.to_string()))?;
        tx.commit().await?;

        if created {
            tracing::info!(player_id, name = %row.name, "player registered");
        }

        Ok(PlayerLookup {
            player: row.into(),
            created,
        })
    }

    /// Top players by balance. `limit` defaults to 10 and is clamped to 0..=100.
    pub async fn leaderboard(&self, limit: Option<i64>) -> BusinessResult<Vec<LeaderboardEntry>> {
        let limit = clamp_limit(limit, DEFAULT_LEADERBOARD_LIMIT);
        let rows = PlayerRepo::leaderboard(self.ctx.pool(), limit).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Player's transactions, newest first
    pub async fn transactions(
        &self,
        player_id: &str,
        limit: Option<i64>,
    ) -> BusinessResult<Vec<Transaction>> {
        let player_id = validate_player_id(player_id)?;
        let limit = clamp_limit(limit, DEFAULT_HISTORY_LIMIT);

        TransactionRepo::list_for_player(self.ctx.pool(), player_id, limit)
            .await?
            .into_iter()
            .map(|row| Transaction::try_from(row).map_err(BusinessError::from))
            .collect()
    }
}
