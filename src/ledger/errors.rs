//! Ledger error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::entities::{Chips, PlayerId};

/// Ledger errors. Every rejection leaves both the balance and the entry
/// journal untouched.
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Serialize)]
pub enum LedgerError {
    /// A debit would take the balance below zero.
    #[error("insufficient balance for player {player_id}: available {available}, required {required}")]
    InsufficientBalance {
        player_id: PlayerId,
        available: Chips,
        required: Chips,
    },

    /// A credit would push the balance past the configured ceiling.
    #[error("balance limit exceeded for player {player_id}: {attempted} > {max_balance}")]
    LimitExceeded {
        player_id: PlayerId,
        attempted: Chips,
        max_balance: Chips,
    },

    #[error("no account for player {0}")]
    AccountNotFound(PlayerId),

    #[error("account already open for player {0}")]
    AccountExists(PlayerId),

    /// Monetary wrappers only accept positive magnitudes.
    #[error("invalid amount: {0}")]
    InvalidAmount(Chips),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
