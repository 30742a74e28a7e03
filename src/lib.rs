//! # Cardroom
//!
//! A real-money card-game engine: Texas Hold'em style poker plus a
//! simpler multi-party Rock-Paper-Scissors variant, where players bet
//! from a persistent balance, act in turn, and are paid out according
//! to hand strength or elimination.
//!
//! The engine enforces strict turn order, validates monetary actions
//! against dynamic limits, ranks five-to-seven-card hands with
//! tie-breaking and split-pot arithmetic, and guarantees that money is
//! never created, destroyed, or left unaccounted for across partial
//! failures.
//!
//! ## Architecture
//!
//! - [`game::eval`]: pure hand evaluation with a total ordering over
//!   hand values; equal values mean a split pot.
//! - [`ledger`]: the authoritative balance-mutation protocol; every
//!   balance change is bounds-checked and journaled atomically.
//! - [`cooldown`]: per-(game, player) action pacing, checked lazily
//!   against the clock.
//! - [`game`]: the betting state machine orchestrating lifecycle, turn
//!   order, round advancement, and showdown resolution.
//! - [`rps`]: the Rock-Paper-Scissors variant on the same ledger and
//!   cooldown plumbing.
//! - [`table`]: one owning actor task per active game, the
//!   serialization point that keeps moves ordered.
//!
//! Transport, authentication, persistence, and payment-provider
//! integration are external collaborators; the engine exposes snapshots
//! for the surrounding system to broadcast and consumes nothing beyond
//! a clock, a shuffle source, and seeded balances.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cardroom::{
//!     CooldownTracker, GameConfig, GameEngine, LedgerManager, TableManager,
//! };
//!
//! # async fn example() -> cardroom::GameResult<()> {
//! let ledger = Arc::new(LedgerManager::new());
//! let cooldowns = Arc::new(CooldownTracker::new());
//! let engine = GameEngine::new(ledger.clone(), cooldowns);
//!
//! ledger.open_account(1, 1_000).await?;
//! ledger.open_account(2, 1_000).await?;
//!
//! let tables = TableManager::new(engine);
//! let game = tables
//!     .create_game(uuid::Uuid::new_v4(), GameConfig::default(), &[1, 2])
//!     .await?;
//! let snapshot = game.initialize().await?;
//! assert_eq!(snapshot.current_player, Some(1));
//! # Ok(())
//! # }
//! ```

/// Core game logic, entities, and the betting state machine.
pub mod game;
pub use game::{
    GameConfig, GameEngine, GameError, GameResult,
    constants::{self, DEFAULT_MAX_BALANCE, DEFAULT_MAX_BET, DEFAULT_MIN_BET, MAX_PLAYERS},
    entities::{
        self, BettingRound, CancelOutcome, Card, Chips, Game, GameId, GameSnapshot, GameStatus,
        MoveAction, MoveOutcome, PlayerId, PlayerStatus, RoomId, Suit, WinnerPayout,
    },
    eval,
};

/// Balance ledger with an immutable audit journal.
pub mod ledger;
pub use ledger::{EntryKind, LedgerConfig, LedgerEntry, LedgerError, LedgerManager, LedgerResult};

/// Per-player action pacing.
pub mod cooldown;
pub use cooldown::{CooldownConfig, CooldownTracker};

/// Multi-party Rock-Paper-Scissors variant.
pub mod rps;
pub use rps::{RpsEngine, RpsGame, RpsMove, RpsOutcome};

/// Per-game actors and their registry.
pub mod table;
pub use table::{GameHandle, TableManager};
