//! Engine-wide constants.

use super::entities::Chips;

/// Hard cap on seats at a single table.
pub const MAX_PLAYERS: usize = 9;

/// Number of hole cards dealt to each player.
pub const HOLE_CARDS: usize = 2;

/// Maximum number of community cards on the board.
pub const BOARD_SIZE: usize = 5;

/// A standard deck: 13 ranks by 4 suits.
pub const DECK_SIZE: usize = 52;

pub const DEFAULT_MIN_BET: Chips = 10;
pub const DEFAULT_MAX_BET: Chips = 1_000;

/// Default ceiling on any single balance. Bounds the house's exposure to
/// a runaway account.
pub const DEFAULT_MAX_BALANCE: Chips = 1_000_000;
