//! Ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::entities::{Chips, GameId, PlayerId};

/// The four monetary action kinds. Every balance mutation is one of these.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Bet,
    Blind,
    Win,
    Refund,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Bet => write!(f, "bet"),
            EntryKind::Blind => write!(f, "blind"),
            EntryKind::Win => write!(f, "win"),
            EntryKind::Refund => write!(f, "refund"),
        }
    }
}

/// Immutable record of one balance mutation. Never updated or deleted;
/// the full sequence forms the audit trail.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub kind: EntryKind,
    /// Signed amount: negative for debits, positive for credits.
    pub amount: Chips,
    pub balance_before: Chips,
    pub balance_after: Chips,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
