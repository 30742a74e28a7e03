//! Ledger manager: the authoritative balance-mutation protocol.

use chrono::Utc;
use log::{debug, warn};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{LedgerError, LedgerResult},
    models::{EntryKind, LedgerEntry},
};
use crate::game::constants::DEFAULT_MAX_BALANCE;
use crate::game::entities::{Chips, GameId, PlayerId};

/// Ledger configuration.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Ceiling on any single balance.
    pub max_balance: Chips,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_balance: std::env::var("CARDROOM_MAX_BALANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BALANCE),
        }
    }
}

/// Balances plus the append-only journal, guarded by one lock so a reader
/// can never observe a balance without its matching entry.
#[derive(Debug, Default)]
struct LedgerBook {
    accounts: HashMap<PlayerId, Chips>,
    entries: Vec<LedgerEntry>,
    next_entry_id: u64,
}

/// Owns every balance the engine may touch and records an immutable
/// before/after entry per mutation. Per-engine-instance state: callers
/// share it via `Arc`, never through process-wide globals.
#[derive(Debug)]
pub struct LedgerManager {
    config: LedgerConfig,
    book: RwLock<LedgerBook>,
}

impl Default for LedgerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            book: RwLock::new(LedgerBook::default()),
        }
    }

    /// Open an account with a starting balance. Seeding balances is the
    /// deposit provider's concern; the engine only moves what is here.
    pub async fn open_account(
        &self,
        player_id: PlayerId,
        starting_balance: Chips,
    ) -> LedgerResult<()> {
        if starting_balance < 0 || starting_balance > self.config.max_balance {
            return Err(LedgerError::InvalidAmount(starting_balance));
        }
        let mut book = self.book.write().await;
        if book.accounts.contains_key(&player_id) {
            return Err(LedgerError::AccountExists(player_id));
        }
        book.accounts.insert(player_id, starting_balance);
        Ok(())
    }

    pub async fn balance(&self, player_id: PlayerId) -> LedgerResult<Chips> {
        let book = self.book.read().await;
        book.accounts
            .get(&player_id)
            .copied()
            .ok_or(LedgerError::AccountNotFound(player_id))
    }

    /// Apply one signed balance mutation atomically: validate bounds,
    /// move the funds, and append the journal entry under a single write
    /// lock. A rejection applies neither.
    pub async fn apply(
        &self,
        player_id: PlayerId,
        amount: Chips,
        game_id: GameId,
        kind: EntryKind,
        description: String,
    ) -> LedgerResult<Chips> {
        let mut book = self.book.write().await;

        let balance_before = *book
            .accounts
            .get(&player_id)
            .ok_or(LedgerError::AccountNotFound(player_id))?;

        let balance_after = balance_before + amount;
        if balance_after < 0 {
            warn!("ledger rejected {kind} of {amount} for player {player_id}: insufficient balance");
            return Err(LedgerError::InsufficientBalance {
                player_id,
                available: balance_before,
                required: -amount,
            });
        }
        if balance_after > self.config.max_balance {
            warn!("ledger rejected {kind} of {amount} for player {player_id}: over balance ceiling");
            return Err(LedgerError::LimitExceeded {
                player_id,
                attempted: balance_after,
                max_balance: self.config.max_balance,
            });
        }

        book.accounts.insert(player_id, balance_after);
        let id = book.next_entry_id;
        book.next_entry_id += 1;
        book.entries.push(LedgerEntry {
            id,
            game_id,
            player_id,
            kind,
            amount,
            balance_before,
            balance_after,
            description,
            created_at: Utc::now(),
        });

        debug!("ledger {kind} {amount} for player {player_id}: {balance_before} -> {balance_after}");
        Ok(balance_after)
    }

    /// Debit a bet. `amount` is a positive magnitude.
    pub async fn bet(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        amount: Chips,
    ) -> LedgerResult<Chips> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.apply(
            player_id,
            -amount,
            game_id,
            EntryKind::Bet,
            format!("Bet of {amount}"),
        )
        .await
    }

    /// Debit a forced blind. `blind_kind` names which blind for the audit
    /// trail ("Small" or "Big").
    pub async fn blind(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        amount: Chips,
        blind_kind: &str,
    ) -> LedgerResult<Chips> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.apply(
            player_id,
            -amount,
            game_id,
            EntryKind::Blind,
            format!("{blind_kind} blind of {amount}"),
        )
        .await
    }

    /// Credit winnings.
    pub async fn win(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        amount: Chips,
        hand_description: &str,
    ) -> LedgerResult<Chips> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.apply(
            player_id,
            amount,
            game_id,
            EntryKind::Win,
            format!("Won {amount} with {hand_description}"),
        )
        .await
    }

    /// Credit a refund.
    pub async fn refund(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        amount: Chips,
        reason: &str,
    ) -> LedgerResult<Chips> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.apply(
            player_id,
            amount,
            game_id,
            EntryKind::Refund,
            format!("Refund of {amount}: {reason}"),
        )
        .await
    }

    /// Split a pot among winners: `floor(pot / n)` each, with the one-unit
    /// remainders going to the first `pot % n` winners in the supplied
    /// order. The total distributed always equals the pot exactly.
    pub async fn distribute_pot(
        &self,
        game_id: GameId,
        pot: Chips,
        winners: &[(PlayerId, String)],
    ) -> LedgerResult<Vec<(PlayerId, Chips)>> {
        if winners.is_empty() || pot <= 0 {
            return Ok(Vec::new());
        }

        let n = winners.len() as Chips;
        let share = pot / n;
        let remainder = pot % n;

        let mut payouts = Vec::with_capacity(winners.len());
        for (i, (player_id, hand_description)) in winners.iter().enumerate() {
            let amount = share + Chips::from((i as Chips) < remainder);
            if amount == 0 {
                continue;
            }
            self.win(*player_id, game_id, amount, hand_description)
                .await?;
            payouts.push((*player_id, amount));
        }
        Ok(payouts)
    }

    /// Refund every nonzero posted bet. Used only when a game is
    /// cancelled before resolution.
    pub async fn refund_all(
        &self,
        game_id: GameId,
        bets: &[(PlayerId, Chips)],
        reason: &str,
    ) -> LedgerResult<Vec<(PlayerId, Chips)>> {
        let mut refunds = Vec::new();
        for (player_id, amount) in bets {
            if *amount <= 0 {
                continue;
            }
            self.refund(*player_id, game_id, *amount, reason).await?;
            refunds.push((*player_id, *amount));
        }
        Ok(refunds)
    }

    /// Read-only entry history for a player, most recent first.
    pub async fn entries_for_player(
        &self,
        player_id: PlayerId,
        limit: usize,
    ) -> Vec<LedgerEntry> {
        let book = self.book.read().await;
        book.entries
            .iter()
            .rev()
            .filter(|e| e.player_id == player_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Read-only entry history for a game, in application order.
    pub async fn entries_for_game(&self, game_id: GameId) -> Vec<LedgerEntry> {
        let book = self.book.read().await;
        book.entries
            .iter()
            .filter(|e| e.game_id == game_id)
            .cloned()
            .collect()
    }
}
