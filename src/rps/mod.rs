//! Multi-party Rock-Paper-Scissors: the simpler real-money variant.
//!
//! Players ante into a shared pot and submit moves simultaneously, with no
//! turn order. With more than two players the winner must be unique:
//! if all moves match, all three moves appear, or several players share
//! the beating move, the round is a draw and every ante is refunded.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::cooldown::CooldownTracker;
use crate::game::entities::{Chips, GameId, GameStatus, PlayerId, RefundReceipt, RoomId};
use crate::game::errors::{GameError, GameResult};
use crate::ledger::LedgerManager;

/// Maximum seats in one Rock-Paper-Scissors round.
pub const MAX_RPS_PLAYERS: usize = 3;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RpsMove {
    Rock,
    Paper,
    Scissors,
}

impl RpsMove {
    /// The move this one beats.
    #[must_use]
    pub fn beats(self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Scissors => Self::Paper,
            Self::Paper => Self::Rock,
        }
    }
}

impl fmt::Display for RpsMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
        };
        write!(f, "{repr}")
    }
}

/// One Rock-Paper-Scissors round. Reuses the poker lifecycle statuses;
/// there is no turn order, so `in_progress` simply means "waiting for
/// moves".
#[derive(Debug)]
pub struct RpsGame {
    pub id: GameId,
    pub room_id: RoomId,
    /// Forced stake each player posts when the round starts.
    pub ante: Chips,
    pub status: GameStatus,
    pub players: Vec<PlayerId>,
    pub moves: HashMap<PlayerId, RpsMove>,
    /// Antes actually posted, for refunds on draw or cancellation.
    pub antes_posted: HashMap<PlayerId, Chips>,
    pub pot: Chips,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RpsGame {
    #[must_use]
    pub fn new(room_id: RoomId, ante: Chips) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            ante,
            status: GameStatus::Waiting,
            players: Vec::new(),
            moves: HashMap::new(),
            antes_posted: HashMap::new(),
            pot: 0,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn add_player(&mut self, player_id: PlayerId) -> bool {
        if self.status != GameStatus::Waiting
            || self.players.len() >= MAX_RPS_PLAYERS
            || self.players.contains(&player_id)
        {
            return false;
        }
        self.players.push(player_id);
        self.antes_posted.insert(player_id, 0);
        true
    }
}

/// How a resolved round ended.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum RpsOutcome {
    Winner {
        player_id: PlayerId,
        amount: Chips,
        winning_move: RpsMove,
    },
    Draw {
        reason: String,
        refunds: Vec<RefundReceipt>,
    },
}

/// Decide a finished move set: the winning and losing moves, or the
/// draw reason.
fn judge(moves: &HashMap<PlayerId, RpsMove>) -> Result<(RpsMove, RpsMove), String> {
    let mut distinct: Vec<RpsMove> = Vec::new();
    for mv in moves.values() {
        if !distinct.contains(mv) {
            distinct.push(*mv);
        }
    }

    match distinct.len() {
        1 => return Err("everyone chose the same move".to_string()),
        3 => return Err("all three moves cancel each other".to_string()),
        _ => {}
    }

    let (a, b) = (distinct[0], distinct[1]);
    let (winning, losing) = if a.beats() == b { (a, b) } else { (b, a) };

    let winner_count = moves.values().filter(|mv| **mv == winning).count();
    if winner_count != 1 {
        return Err("multiple players used the winning move".to_string());
    }
    Ok((winning, losing))
}

/// Drives Rock-Paper-Scissors rounds against the shared ledger and
/// cooldown store, mirroring the poker engine's contract.
#[derive(Clone)]
pub struct RpsEngine {
    ledger: Arc<LedgerManager>,
    cooldowns: Arc<CooldownTracker>,
}

impl RpsEngine {
    #[must_use]
    pub fn new(ledger: Arc<LedgerManager>, cooldowns: Arc<CooldownTracker>) -> Self {
        Self { ledger, cooldowns }
    }

    /// Start a round: every player antes into the pot. An ante that
    /// cannot be posted refuses the start, refunding anything already
    /// collected.
    pub async fn start(&self, game: &mut RpsGame) -> GameResult<()> {
        if game.status != GameStatus::Waiting {
            return Err(GameError::IllegalTransition {
                from: game.status,
                to: GameStatus::Starting,
            });
        }
        if game.players.len() < 2 {
            return Err(GameError::InvalidMove("need at least 2 players".to_string()));
        }
        if game.ante <= 0 {
            return Err(GameError::InvalidMove("ante must be positive".to_string()));
        }
        for player_id in &game.players {
            if let Some(remaining) = self.cooldowns.remaining_for_player(*player_id).await {
                return Err(GameError::CooldownActive {
                    player_id: *player_id,
                    remaining_secs: remaining.num_seconds().max(1),
                });
            }
        }

        game.status = GameStatus::Starting;
        for i in 0..game.players.len() {
            let player_id = game.players[i];
            if let Err(err) = self.ledger.bet(player_id, game.id, game.ante).await {
                // Give back what was collected and stay startable.
                let posted: Vec<(PlayerId, Chips)> = game
                    .antes_posted
                    .iter()
                    .map(|(p, amount)| (*p, *amount))
                    .collect();
                self.ledger
                    .refund_all(game.id, &posted, "Round failed to start")
                    .await?;
                for amount in game.antes_posted.values_mut() {
                    *amount = 0;
                }
                game.pot = 0;
                game.status = GameStatus::Waiting;
                return Err(err.into());
            }
            game.antes_posted.insert(player_id, game.ante);
            game.pot += game.ante;
        }

        game.status = GameStatus::InProgress;
        info!(
            "rps game {}: started with {} players, pot {}",
            game.id,
            game.players.len(),
            game.pot
        );
        Ok(())
    }

    /// Record one player's move. Resolution happens on the last move in;
    /// until then the result is `None`.
    pub async fn submit_move(
        &self,
        game: &mut RpsGame,
        player_id: PlayerId,
        mv: RpsMove,
    ) -> GameResult<Option<RpsOutcome>> {
        if game.status != GameStatus::InProgress {
            return Err(GameError::InvalidMove(format!("game is {}", game.status)));
        }
        if !game.players.contains(&player_id) {
            return Err(GameError::PlayerNotSeated(player_id));
        }
        if game.moves.contains_key(&player_id) {
            return Err(GameError::InvalidMove("move already submitted".to_string()));
        }

        game.moves.insert(player_id, mv);
        if game.moves.len() < game.players.len() {
            return Ok(None);
        }
        self.resolve(game).await.map(Some)
    }

    async fn resolve(&self, game: &mut RpsGame) -> GameResult<RpsOutcome> {
        let outcome = match judge(&game.moves) {
            Ok((winning, losing)) => {
                let winner_id = game
                    .players
                    .iter()
                    .copied()
                    .find(|p| game.moves.get(p) == Some(&winning))
                    .ok_or_else(|| GameError::InvariantViolation {
                        game_id: game.id,
                        detail: "winning move has no owner".to_string(),
                    })?;
                let description = format!("{winning} beats {losing}");
                let payouts = self
                    .ledger
                    .distribute_pot(game.id, game.pot, &[(winner_id, description)])
                    .await?;
                let amount = payouts.first().map(|(_, amount)| *amount).unwrap_or(0);
                game.pot = 0;
                info!("rps game {}: player {winner_id} wins {amount} with {winning}", game.id);
                RpsOutcome::Winner {
                    player_id: winner_id,
                    amount,
                    winning_move: winning,
                }
            }
            Err(reason) => {
                let posted: Vec<(PlayerId, Chips)> = game
                    .players
                    .iter()
                    .map(|p| (*p, game.antes_posted.get(p).copied().unwrap_or(0)))
                    .collect();
                let refunds = self
                    .ledger
                    .refund_all(game.id, &posted, &format!("Draw: {reason}"))
                    .await?;
                game.pot = 0;
                info!("rps game {}: draw ({reason})", game.id);
                RpsOutcome::Draw {
                    reason,
                    refunds: refunds
                        .into_iter()
                        .map(|(player_id, amount)| RefundReceipt { player_id, amount })
                        .collect(),
                }
            }
        };

        game.status = GameStatus::Completed;
        game.ended_at = Some(Utc::now());
        self.cooldowns.handle_game_end(game.id, &game.players).await;
        Ok(outcome)
    }

    /// Cancel a round before it resolves, refunding posted antes.
    pub async fn cancel(&self, game: &mut RpsGame) -> GameResult<Vec<RefundReceipt>> {
        if game.status.is_terminal() {
            return Err(GameError::IllegalTransition {
                from: game.status,
                to: GameStatus::Cancelled,
            });
        }

        let posted: Vec<(PlayerId, Chips)> = game
            .players
            .iter()
            .map(|p| (*p, game.antes_posted.get(p).copied().unwrap_or(0)))
            .collect();
        let refunds = self
            .ledger
            .refund_all(game.id, &posted, "Game cancelled")
            .await?;
        for amount in game.antes_posted.values_mut() {
            *amount = 0;
        }
        game.pot = 0;
        game.status = GameStatus::Cancelled;
        game.ended_at = Some(Utc::now());
        self.cooldowns.clear_game(game.id).await;
        info!("rps game {}: cancelled, {} refunds issued", game.id, refunds.len());

        Ok(refunds
            .into_iter()
            .map(|(player_id, amount)| RefundReceipt { player_id, amount })
            .collect())
    }
}
