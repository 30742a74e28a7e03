use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};
use uuid::Uuid;

use super::config::GameConfig;
use super::constants::{BOARD_SIZE, DECK_SIZE};

/// Type alias for chips in smallest units. Signed so that ledger amounts
/// can carry direction; balances themselves never go below zero.
pub type Chips = i64;

/// External player identity. The engine owns the numeric balance attached
/// to this id, never the identity itself.
pub type PlayerId = i64;

pub type GameId = Uuid;
pub type RoomId = Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuce is 2, ace is 14; aces play high only.
pub type Value = u8;

/// A card is a tuple of a value and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            14 => write!(f, "A{}", self.1),
            13 => write!(f, "K{}", self.1),
            12 => write!(f, "Q{}", self.1),
            11 => write!(f, "J{}", self.1),
            v => write!(f, "{v}{}", self.1),
        }
    }
}

/// A shuffled deck, consumed card by card over the course of one hand.
/// Never re-dealt: a fresh deck is built for every hand.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    /// Build a full 52-card deck and shuffle it.
    #[must_use]
    pub fn shuffled() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for value in 2..=14u8 {
            for suit in Suit::ALL {
                cards.push(Card(value, suit));
            }
        }
        cards.shuffle(&mut rand::rng());
        Self { cards, next: 0 }
    }

    /// Deal the next card, or `None` once the deck is exhausted.
    pub fn deal(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied();
        if card.is_some() {
            self.next += 1;
        }
        card
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::shuffled()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Starting,
    InProgress,
    Completed,
    Cancelled,
    /// Terminal state reserved for invariant violations. A faulted game
    /// accepts no further moves and needs operator intervention.
    Faulted,
}

impl GameStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Faulted)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Starting => "starting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Faulted => "faulted",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BettingRound {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl BettingRound {
    /// Community cards dealt when this round begins. Hole cards are dealt
    /// separately during game initialization.
    #[must_use]
    pub fn cards_to_deal(self) -> usize {
        match self {
            Self::PreFlop | Self::Showdown => 0,
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::PreFlop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River | Self::Showdown => Self::Showdown,
        }
    }
}

impl fmt::Display for BettingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "Pre-Flop",
            Self::Flop => "Flop",
            Self::Turn => "Turn",
            Self::River => "River",
            Self::Showdown => "Showdown",
        };
        write!(f, "{repr}")
    }
}

/// Per-player standing within the current hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Folded,
    /// The player's whole balance is in the pot; they cannot be forced to
    /// contribute further this hand but still reach showdown.
    AllIn,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    Bet,
    Raise,
    Call,
    Check,
    Fold,
}

impl fmt::Display for MoveAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Bet => "bet",
            Self::Raise => "raise",
            Self::Call => "call",
            Self::Check => "check",
            Self::Fold => "fold",
        };
        write!(f, "{repr}")
    }
}

/// Snapshot of the most recent applied move.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LastAction {
    pub player_id: PlayerId,
    pub action: MoveAction,
    pub amount: Chips,
    pub at: DateTime<Utc>,
}

/// One poker hand/session instance. The participant list and the parallel
/// per-player tables are always mutated together; `add_player` and
/// `remove_player` are the only seams for doing so.
#[derive(Debug)]
pub struct Game {
    pub id: GameId,
    pub room_id: RoomId,
    pub config: GameConfig,
    pub status: GameStatus,
    /// Participants in table order, fixed once the hand starts.
    pub players: Vec<PlayerId>,
    pub player_status: HashMap<PlayerId, PlayerStatus>,
    /// Chips posted by each player in the current betting round.
    pub round_bets: HashMap<PlayerId, Chips>,
    /// Chips posted by each player across the whole hand. Drives refunds
    /// and the pot-conservation check.
    pub hand_bets: HashMap<PlayerId, Chips>,
    pub hole_cards: HashMap<PlayerId, Vec<Card>>,
    /// Players that have taken a voluntary action this round. Blinds do
    /// not count: the big blind still gets the option to check.
    pub acted_this_round: HashSet<PlayerId>,
    pub current_player: Option<PlayerId>,
    pub pot: Chips,
    /// Chips already paid out of the pot this hand.
    pub paid_out: Chips,
    pub round: BettingRound,
    pub community: Vec<Card>,
    pub(crate) deck: Deck,
    pub last_action: Option<LastAction>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Game {
    #[must_use]
    pub fn new(room_id: RoomId, config: GameConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            config,
            status: GameStatus::Waiting,
            players: Vec::new(),
            player_status: HashMap::new(),
            round_bets: HashMap::new(),
            hand_bets: HashMap::new(),
            hole_cards: HashMap::new(),
            acted_this_round: HashSet::new(),
            current_player: None,
            pot: 0,
            paid_out: 0,
            round: BettingRound::PreFlop,
            community: Vec::with_capacity(BOARD_SIZE),
            deck: Deck::shuffled(),
            last_action: None,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Seat a player. Returns false when the table is full, the game has
    /// already started, or the player is already seated.
    pub fn add_player(&mut self, player_id: PlayerId) -> bool {
        if self.status != GameStatus::Waiting
            || self.players.len() >= self.config.max_players
            || self.players.contains(&player_id)
        {
            return false;
        }
        self.players.push(player_id);
        self.player_status.insert(player_id, PlayerStatus::Active);
        self.round_bets.insert(player_id, 0);
        self.hand_bets.insert(player_id, 0);
        true
    }

    /// Unseat a player before the hand starts. All parallel tables are
    /// cleared together.
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        let Some(idx) = self.players.iter().position(|p| *p == player_id) else {
            return false;
        };
        self.players.remove(idx);
        self.player_status.remove(&player_id);
        self.round_bets.remove(&player_id);
        self.hand_bets.remove(&player_id);
        self.hole_cards.remove(&player_id);
        self.acted_this_round.remove(&player_id);
        true
    }

    #[must_use]
    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.players.contains(&player_id)
    }

    /// Players still in the hand: everyone who has not folded.
    #[must_use]
    pub fn players_in_hand(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .copied()
            .filter(|p| self.player_status.get(p) != Some(&PlayerStatus::Folded))
            .collect()
    }

    /// Players that can still be asked to bet: in the hand and not all-in.
    #[must_use]
    pub fn bettable_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .copied()
            .filter(|p| self.player_status.get(p) == Some(&PlayerStatus::Active))
            .collect()
    }

    /// The highest current-round contribution among players still in the
    /// hand; what everyone else has to match to stay in.
    #[must_use]
    pub fn round_max(&self) -> Chips {
        self.players_in_hand()
            .iter()
            .map(|p| self.round_bet(*p))
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn round_bet(&self, player_id: PlayerId) -> Chips {
        self.round_bets.get(&player_id).copied().unwrap_or(0)
    }

    /// Total chips contributed to the pot this hand, across all rounds.
    #[must_use]
    pub fn contributed(&self) -> Chips {
        self.hand_bets.values().sum()
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id,
            room_id: self.room_id,
            status: self.status,
            round: self.round,
            current_player: self.current_player,
            pot: self.pot,
            bets: self.round_bets.iter().map(|(k, v)| (*k, *v)).collect(),
            player_status: self.player_status.iter().map(|(k, v)| (*k, *v)).collect(),
            community: self.community.clone(),
            last_action: self.last_action.clone(),
        }
    }
}

/// Serializable view of a game, with everything the transport layer needs
/// to broadcast to connected clients. Hole cards and the deck are withheld.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub room_id: RoomId,
    pub status: GameStatus,
    pub round: BettingRound,
    pub current_player: Option<PlayerId>,
    pub pot: Chips,
    pub bets: BTreeMap<PlayerId, Chips>,
    pub player_status: BTreeMap<PlayerId, PlayerStatus>,
    pub community: Vec<Card>,
    pub last_action: Option<LastAction>,
}

/// A single winner's share of a resolved pot.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WinnerPayout {
    pub player_id: PlayerId,
    pub amount: Chips,
    /// Human-readable hand name; `None` for an uncontested win.
    pub hand: Option<String>,
}

/// Result of an applied move. `winners` is populated only when the move
/// resolved the hand.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub snapshot: GameSnapshot,
    pub winners: Option<Vec<WinnerPayout>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RefundReceipt {
    pub player_id: PlayerId,
    pub amount: Chips,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CancelOutcome {
    pub status: GameStatus,
    pub refunds: Vec<RefundReceipt>,
}
