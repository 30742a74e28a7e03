//! Per-game betting configuration.

use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_MAX_BET, DEFAULT_MIN_BET, MAX_PLAYERS};
use super::entities::Chips;
use super::errors::{GameError, GameResult};

/// Immutable betting limits for one game. Fixed at creation; the engine
/// validates every monetary action against these bounds.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameConfig {
    /// Minimum opening bet. The big blind equals this; the small blind is
    /// half of it.
    pub min_bet: Chips,

    /// Maximum size of any single bet or raise-to amount.
    pub max_bet: Chips,

    /// Seats at the table.
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        let min_bet = std::env::var("CARDROOM_MIN_BET")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_BET);

        let max_bet = std::env::var("CARDROOM_MAX_BET")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_BET);

        Self {
            min_bet,
            max_bet,
            max_players: MAX_PLAYERS,
        }
    }
}

impl GameConfig {
    /// Validate configuration.
    pub fn validate(&self) -> GameResult<()> {
        if self.min_bet <= 0 {
            return Err(GameError::InvalidMove(format!(
                "minimum bet must be positive, got {}",
                self.min_bet
            )));
        }

        if self.max_bet < self.min_bet {
            return Err(GameError::InvalidMove(format!(
                "maximum bet {} is below minimum bet {}",
                self.max_bet, self.min_bet
            )));
        }

        if self.max_players < 2 || self.max_players > MAX_PLAYERS {
            return Err(GameError::InvalidMove(format!(
                "max players must be between 2 and {MAX_PLAYERS}"
            )));
        }

        Ok(())
    }

    /// The forced bet posted by the first player before cards are seen.
    #[must_use]
    pub fn small_blind(&self) -> Chips {
        self.min_bet / 2
    }

    /// The forced bet posted by the second player before cards are seen.
    #[must_use]
    pub fn big_blind(&self) -> Chips {
        self.min_bet
    }
}
