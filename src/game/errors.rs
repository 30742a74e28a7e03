//! Engine error taxonomy.
//!
//! Every player-facing error is recoverable at the call site; none
//! requires restarting the engine. Invariant violations are the one
//! exception: they fault the game they occur in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{GameId, GameStatus, PlayerId};
use crate::ledger::LedgerError;

/// Errors surfaced by engine operations.
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Serialize)]
pub enum GameError {
    /// The caller violated a betting rule: wrong turn, bad amount, wrong
    /// phase. State is unchanged.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The player must wait before acting again.
    #[error("player {player_id} is on cooldown for {remaining_secs}s")]
    CooldownActive {
        player_id: PlayerId,
        remaining_secs: i64,
    },

    /// A state-machine transition was requested from a state that forbids
    /// it, e.g. cancelling an in-progress game.
    #[error("cannot move game from {from} to {to}")]
    IllegalTransition { from: GameStatus, to: GameStatus },

    #[error("game {0} does not exist")]
    GameNotFound(GameId),

    #[error("player {0} is not seated in this game")]
    PlayerNotSeated(PlayerId),

    /// The game's actor has shut down; no further operations are possible.
    #[error("game {0} is closed")]
    GameClosed(GameId),

    /// Monetary rejection from the ledger (insufficient balance, balance
    /// ceiling, unknown account). Game state is unchanged.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Money accounting no longer adds up. Fatal for this game: it is
    /// forced into `GameStatus::Faulted` and requires operator
    /// intervention.
    #[error("invariant violation in game {game_id}: {detail}")]
    InvariantViolation { game_id: GameId, detail: String },
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_move_carries_reason() {
        let err = GameError::InvalidMove("not your turn".to_string());
        assert_eq!(err.to_string(), "invalid move: not your turn");
    }

    #[test]
    fn ledger_errors_pass_through() {
        let err: GameError = LedgerError::AccountNotFound(7).into();
        assert_eq!(err.to_string(), "no account for player 7");
    }
}
