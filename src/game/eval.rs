//! Pure hand evaluation: no side effects, no I/O, deterministic.
//!
//! Hands are totally ordered by `HandValue`: rank class first, then the
//! kicker list lexicographically. Equal values signal a split pot. Aces
//! play high only.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::entities::{Card, PlayerId, Suit, Value};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::OnePair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
        };
        write!(f, "{repr}")
    }
}

/// A totally ordered hand strength: rank class plus tie-breaking kickers.
/// The derived `Ord` compares rank first, then kickers in order, which is
/// exactly the comparison the betting engine needs.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub rank: HandRank,
    pub kickers: Vec<Value>,
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rank == HandRank::StraightFlush && self.kickers.first() == Some(&14) {
            return write!(f, "Royal Flush");
        }
        write!(f, "{}", self.rank)
    }
}

/// Highest card of a 5-long run among the given values, if any. Ace plays
/// high only, so A-2-3-4-5 is not a straight here.
fn straight_high(values: &[Value]) -> Option<Value> {
    let mut distinct = values.to_vec();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();
    if distinct.len() < 5 {
        return None;
    }
    for window in distinct.windows(5) {
        if window[0] - window[4] == 4 {
            return Some(window[0]);
        }
    }
    None
}

/// Evaluate the best 5-card hand from 5 to 7 cards.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    let mut counts: BTreeMap<Value, u8> = BTreeMap::new();
    let mut suited: HashMap<Suit, Vec<Value>> = HashMap::new();
    for card in cards {
        *counts.entry(card.0).or_default() += 1;
        suited.entry(card.1).or_default().push(card.0);
    }

    let flush_values = suited.values().find(|values| values.len() >= 5);

    if let Some(values) = flush_values
        && let Some(high) = straight_high(values)
    {
        return HandValue {
            rank: HandRank::StraightFlush,
            kickers: vec![high],
        };
    }

    // Distinct values, highest first, for kicker fill.
    let distinct_desc: Vec<Value> = counts.keys().rev().copied().collect();

    // Value groups ordered by count descending, then value descending.
    let mut groups: Vec<(u8, Value)> = counts.iter().map(|(v, c)| (*c, *v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let of_count = |n: u8| -> Vec<Value> {
        groups
            .iter()
            .filter(|(count, _)| *count == n)
            .map(|(_, value)| *value)
            .collect()
    };

    let quads = of_count(4);
    let trips = of_count(3);
    let pairs = of_count(2);

    if let Some(&quad) = quads.first() {
        let mut kickers = vec![quad];
        kickers.extend(distinct_desc.iter().copied().find(|v| *v != quad));
        return HandValue {
            rank: HandRank::FourOfAKind,
            kickers,
        };
    }

    if let Some(&trip) = trips.first() {
        // A second trip's top two cards serve as the pair.
        let pair = trips.get(1).copied().or_else(|| pairs.first().copied());
        if let Some(pair) = pair {
            return HandValue {
                rank: HandRank::FullHouse,
                kickers: vec![trip, pair],
            };
        }
    }

    if let Some(values) = flush_values {
        let mut kickers = values.clone();
        kickers.sort_unstable_by(|a, b| b.cmp(a));
        kickers.truncate(5);
        return HandValue {
            rank: HandRank::Flush,
            kickers,
        };
    }

    let all_values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    if let Some(high) = straight_high(&all_values) {
        return HandValue {
            rank: HandRank::Straight,
            kickers: vec![high],
        };
    }

    if let Some(&trip) = trips.first() {
        let mut kickers = vec![trip];
        kickers.extend(distinct_desc.iter().copied().filter(|v| *v != trip).take(2));
        return HandValue {
            rank: HandRank::ThreeOfAKind,
            kickers,
        };
    }

    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let mut kickers = vec![high, low];
        kickers.extend(
            distinct_desc
                .iter()
                .copied()
                .find(|v| *v != high && *v != low),
        );
        return HandValue {
            rank: HandRank::TwoPair,
            kickers,
        };
    }

    if let Some(&pair) = pairs.first() {
        let mut kickers = vec![pair];
        kickers.extend(distinct_desc.iter().copied().filter(|v| *v != pair).take(3));
        return HandValue {
            rank: HandRank::OnePair,
            kickers,
        };
    }

    HandValue {
        rank: HandRank::HighCard,
        kickers: distinct_desc.into_iter().take(5).collect(),
    }
}

/// Compare two hand values. `Ordering::Equal` signals a split pot.
#[must_use]
pub fn compare(a: &HandValue, b: &HandValue) -> Ordering {
    a.cmp(b)
}

/// Evaluate every player's best hand against the shared community cards
/// and return all players whose hand equals the maximum, in id order.
/// A single player wins outright without evaluation.
#[must_use]
pub fn evaluate_many(
    hands: &BTreeMap<PlayerId, Vec<Card>>,
    community: &[Card],
) -> Vec<PlayerId> {
    if hands.len() <= 1 {
        return hands.keys().copied().collect();
    }

    let evaluated: Vec<(PlayerId, HandValue)> = hands
        .iter()
        .map(|(player_id, hole)| {
            let mut cards = hole.clone();
            cards.extend_from_slice(community);
            (*player_id, evaluate(&cards))
        })
        .collect();

    let Some(best) = evaluated.iter().map(|(_, value)| value).max().cloned() else {
        return Vec::new();
    };

    evaluated
        .into_iter()
        .filter(|(_, value)| *value == best)
        .map(|(player_id, _)| player_id)
        .collect()
}
