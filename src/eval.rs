//! Card types and 7-card hand evaluation.
//!
//! The pot distributor only needs an ordering over hands and tie detection,
//! so ranking sits behind the [`HandEvaluator`] trait. [`NativeEvaluator`]
//! is the built-in implementation; callers with their own evaluator (e.g. a
//! lookup-table one) can plug it in at the same seam.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for card values. Deuce is 2, ace is 14.
pub type Value = u8;

/// Compact card id in `0..52`: `suit * 13 + rank`, where rank 0 is the
/// deuce and rank 12 the ace. This is the form seats and boards carry.
pub type CardIndex = u8;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// A card is a tuple of a value (deuce=2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    /// Decode a compact `0..52` card id. Returns `None` out of range.
    #[must_use]
    pub fn from_index(idx: CardIndex) -> Option<Self> {
        if idx >= 52 {
            return None;
        }
        let suit = match idx / 13 {
            0 => Suit::Club,
            1 => Suit::Diamond,
            2 => Suit::Heart,
            _ => Suit::Spade,
        };
        Some(Self(idx % 13 + 2, suit))
    }

    #[must_use]
    pub fn index(self) -> CardIndex {
        let suit = match self.1 {
            Suit::Club => 0,
            Suit::Diamond => 1,
            Suit::Heart => 2,
            Suit::Spade => 3,
        };
        suit * 13 + (self.0 - 2)
    }
}

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

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
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
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
        };
        write!(f, "{repr}")
    }
}

/// Evaluation of a hand: its rank class plus the tiebreak values in
/// descending significance. Derived `Ord` compares rank first, then the
/// values lexicographically, which is exactly poker's ordering since two
/// hands of the same rank class produce value vectors of the same length.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RankedHand {
    pub rank: HandRank,
    pub values: Vec<Value>,
}

/// Evaluate the best 5-card hand over the given cards (2 to 7 of them).
#[must_use]
pub fn eval(cards: &[Card]) -> RankedHand {
    let mut counts = [0u8; 15];
    let mut by_suit: [Vec<Value>; 4] = Default::default();
    for card in cards {
        // Tolerate ace-low inputs.
        let value = if card.0 == 1 { 14 } else { card.0 };
        counts[value as usize] += 1;
        let suit = match card.1 {
            Suit::Club => 0,
            Suit::Diamond => 1,
            Suit::Heart => 2,
            Suit::Spade => 3,
        };
        by_suit[suit].push(value);
    }

    let flush = by_suit.iter_mut().find(|values| values.len() >= 5).map(|values| {
        values.sort_unstable_by(|a, b| b.cmp(a));
        values.clone()
    });

    if let Some(values) = &flush {
        if let Some(hi) = straight_high(values) {
            return RankedHand {
                rank: HandRank::StraightFlush,
                values: vec![hi],
            };
        }
    }

    let mut quads = Vec::new();
    let mut trips = Vec::new();
    let mut pairs = Vec::new();
    let mut singles = Vec::new();
    for value in (2..=14u8).rev() {
        match counts[value as usize] {
            4 => quads.push(value),
            3 => trips.push(value),
            2 => pairs.push(value),
            1 => singles.push(value),
            _ => {}
        }
    }

    if let Some(&quad) = quads.first() {
        let kicker = kickers(&counts, &[quad], 1);
        let mut values = vec![quad];
        values.extend(kicker);
        return RankedHand {
            rank: HandRank::FourOfAKind,
            values,
        };
    }

    // Seven cards can hold two trips; the lower one fills the boat.
    if let Some(&trip) = trips.first() {
        let pair = trips.get(1).copied().or_else(|| pairs.first().copied());
        if let Some(pair) = pair {
            return RankedHand {
                rank: HandRank::FullHouse,
                values: vec![trip, pair],
            };
        }
    }

    if let Some(values) = flush {
        return RankedHand {
            rank: HandRank::Flush,
            values: values.into_iter().take(5).collect(),
        };
    }

    let all_values: Vec<Value> = (2..=14u8)
        .rev()
        .filter(|&v| counts[v as usize] > 0)
        .collect();
    if let Some(hi) = straight_high(&all_values) {
        return RankedHand {
            rank: HandRank::Straight,
            values: vec![hi],
        };
    }

    if let Some(&trip) = trips.first() {
        let mut values = vec![trip];
        values.extend(kickers(&counts, &[trip], 2));
        return RankedHand {
            rank: HandRank::ThreeOfAKind,
            values,
        };
    }

    if pairs.len() >= 2 {
        let (hi, lo) = (pairs[0], pairs[1]);
        let mut values = vec![hi, lo];
        values.extend(kickers(&counts, &[hi, lo], 1));
        return RankedHand {
            rank: HandRank::TwoPair,
            values,
        };
    }

    if let Some(&pair) = pairs.first() {
        let mut values = vec![pair];
        values.extend(kickers(&counts, &[pair], 3));
        return RankedHand {
            rank: HandRank::OnePair,
            values,
        };
    }

    RankedHand {
        rank: HandRank::HighCard,
        values: singles.into_iter().take(5).collect(),
    }
}

/// Highest straight top value within `values`, or `None`. The ace doubles
/// as a one for the wheel.
fn straight_high(values: &[Value]) -> Option<Value> {
    let mut present = [false; 15];
    for &value in values {
        present[value as usize] = true;
    }
    // Ace plays low in A-2-3-4-5.
    present[1] = present[14];
    for hi in (5..=14u8).rev() {
        if (hi - 4..=hi).all(|v| present[v as usize]) {
            return Some(hi);
        }
    }
    None
}

fn kickers(counts: &[u8; 15], used: &[Value], n: usize) -> Vec<Value> {
    (2..=14u8)
        .rev()
        .filter(|v| counts[*v as usize] > 0 && !used.contains(v))
        .take(n)
        .collect()
}

/// Indices of all hands tied for best. A single hand always wins; equal
/// hands all win.
#[must_use]
pub fn argmax(hands: &[RankedHand]) -> Vec<usize> {
    let Some(best) = hands.iter().max() else {
        return Vec::new();
    };
    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| *hand == best)
        .map(|(i, _)| i)
        .collect()
}

/// Ranking collaborator used by the pot distributor: it only relies on
/// ordering and tie detection, never on hand descriptions.
pub trait HandEvaluator {
    fn solve(&self, cards: &[Card; 7]) -> RankedHand;

    /// Indices of all hands tied for best.
    fn winners(&self, hands: &[RankedHand]) -> Vec<usize> {
        argmax(hands)
    }
}

/// The built-in 7-card evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeEvaluator;

impl HandEvaluator for NativeEvaluator {
    fn solve(&self, cards: &[Card; 7]) -> RankedHand {
        eval(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(pairs: &[(Value, Suit)]) -> Vec<Card> {
        pairs.iter().map(|&(v, s)| Card(v, s)).collect()
    }

    #[test]
    fn test_card_index_round_trip() {
        for idx in 0..52u8 {
            let card = Card::from_index(idx).unwrap();
            assert_eq!(card.index(), idx);
        }
        assert_eq!(Card::from_index(52), None);
    }

    #[test]
    fn test_card_index_layout() {
        // 0 is the deuce of clubs, 51 the ace of spades.
        assert_eq!(Card::from_index(0), Some(Card(2, Suit::Club)));
        assert_eq!(Card::from_index(12), Some(Card(14, Suit::Club)));
        assert_eq!(Card::from_index(13), Some(Card(2, Suit::Diamond)));
        assert_eq!(Card::from_index(51), Some(Card(14, Suit::Spade)));
    }

    #[test]
    fn test_eval_royal_flush() {
        let hand = eval(&cards(&[
            (14, Suit::Heart),
            (13, Suit::Heart),
            (12, Suit::Heart),
            (11, Suit::Heart),
            (10, Suit::Heart),
            (9, Suit::Spade),
            (2, Suit::Club),
        ]));
        assert_eq!(hand.rank, HandRank::StraightFlush);
        assert_eq!(hand.values, vec![14]);
    }

    #[test]
    fn test_eval_wheel_straight() {
        let hand = eval(&cards(&[
            (14, Suit::Heart),
            (2, Suit::Club),
            (3, Suit::Diamond),
            (4, Suit::Heart),
            (5, Suit::Spade),
            (9, Suit::Spade),
            (13, Suit::Club),
        ]));
        assert_eq!(hand.rank, HandRank::Straight);
        assert_eq!(hand.values, vec![5]);
    }

    #[test]
    fn test_eval_full_house_from_two_trips() {
        let hand = eval(&cards(&[
            (8, Suit::Club),
            (8, Suit::Diamond),
            (8, Suit::Heart),
            (3, Suit::Club),
            (3, Suit::Diamond),
            (3, Suit::Heart),
            (14, Suit::Spade),
        ]));
        assert_eq!(hand.rank, HandRank::FullHouse);
        assert_eq!(hand.values, vec![8, 3]);
    }

    #[test]
    fn test_eval_four_of_a_kind_kicker() {
        let hand = eval(&cards(&[
            (9, Suit::Club),
            (9, Suit::Diamond),
            (9, Suit::Heart),
            (9, Suit::Spade),
            (14, Suit::Spade),
            (7, Suit::Club),
            (2, Suit::Club),
        ]));
        assert_eq!(hand.rank, HandRank::FourOfAKind);
        assert_eq!(hand.values, vec![9, 14]);
    }

    #[test]
    fn test_eval_two_pair_kicker() {
        let hand = eval(&cards(&[
            (12, Suit::Club),
            (12, Suit::Diamond),
            (5, Suit::Heart),
            (5, Suit::Spade),
            (14, Suit::Spade),
            (7, Suit::Club),
            (2, Suit::Club),
        ]));
        assert_eq!(hand.rank, HandRank::TwoPair);
        assert_eq!(hand.values, vec![12, 5, 14]);
    }

    #[test]
    fn test_eval_flush_beats_straight() {
        let flush = eval(&cards(&[
            (13, Suit::Club),
            (11, Suit::Club),
            (8, Suit::Club),
            (5, Suit::Club),
            (3, Suit::Club),
        ]));
        let straight = eval(&cards(&[
            (10, Suit::Spade),
            (9, Suit::Heart),
            (8, Suit::Diamond),
            (7, Suit::Club),
            (6, Suit::Spade),
        ]));
        assert!(flush > straight);
    }

    #[test]
    fn test_eval_two_cards() {
        let hand = eval(&cards(&[(14, Suit::Spade), (14, Suit::Heart)]));
        assert_eq!(hand.rank, HandRank::OnePair);
        assert_eq!(hand.values, vec![14]);
    }

    #[test]
    fn test_argmax_tie() {
        let a = eval(&cards(&[
            (10, Suit::Heart),
            (10, Suit::Diamond),
            (5, Suit::Club),
            (3, Suit::Spade),
            (2, Suit::Heart),
        ]));
        let b = eval(&cards(&[
            (10, Suit::Spade),
            (10, Suit::Club),
            (5, Suit::Heart),
            (3, Suit::Diamond),
            (2, Suit::Club),
        ]));
        let c = eval(&cards(&[
            (9, Suit::Heart),
            (9, Suit::Diamond),
            (5, Suit::Club),
            (3, Suit::Spade),
            (2, Suit::Heart),
        ]));
        assert_eq!(argmax(&[a, b, c]), vec![0, 1]);
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_native_evaluator_solve() {
        let seven = [
            Card(14, Suit::Heart),
            Card(13, Suit::Heart),
            Card(12, Suit::Heart),
            Card(11, Suit::Heart),
            Card(10, Suit::Heart),
            Card(9, Suit::Spade),
            Card(2, Suit::Club),
        ];
        let hand = NativeEvaluator.solve(&seven);
        assert_eq!(hand.rank, HandRank::StraightFlush);
        assert_eq!(NativeEvaluator.winners(&[hand.clone(), hand]), vec![0, 1]);
    }
}
