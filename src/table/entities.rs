//! Caller-owned snapshot types the referee reasons over.
//!
//! The referee never mutates a [`Seat`]; every function reads a lineup
//! snapshot plus the current [`Street`] and derives state from each seat's
//! most recent receipt.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::eval::CardIndex;

/// Type alias for whole chips. All contributions and payouts are whole
/// chips.
///
/// If the total money in a hand ever surpasses ~18 quintillion, then we may
/// have a problem.
pub type Chips = u64;

/// Type alias for seat positions within a lineup.
pub type SeatIndex = usize;

/// A 20-byte account id, derived from the low 20 bytes of the Keccak-256
/// hash of the holder's uncompressed public key. The all-zero address is
/// the empty-seat sentinel.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0; 20]);

    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the empty-seat sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 20]
    }

    /// The cheap signer hint carried in a receipt head: the last two bytes.
    #[must_use]
    pub const fn hint(&self) -> [u8; 2] {
        [self.0[18], self.0[19]]
    }

    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Some(Self(bytes.try_into().ok()?))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Why a seat is not participating this hand. `AllIn` is the special case
/// of a seat with no more chips that stays eligible for pots it already
/// contributed to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Sitout {
    /// Sat out at the given timestamp (e.g. after an action timeout).
    Since(u64),
    AllIn,
}

/// The six ordered phases of a hand plus the pre-hand `Waiting` state.
/// Ordering follows hand progression.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Street {
    Waiting,
    Dealing,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Dealing => "dealing",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// One seat of a lineup snapshot. `last` holds the seat's most recent
/// receipt in encoded form; the referee dereferences it through the
/// receipt cache.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    pub address: Address,
    pub last: Option<String>,
    pub sitout: Option<Sitout>,
    pub cards: Option<[CardIndex; 2]>,
}

impl Default for Address {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Seat {
    /// An unoccupied seat.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn taken(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_last(mut self, encoded: impl Into<String>) -> Self {
        self.last = Some(encoded.into());
        self
    }

    #[must_use]
    pub fn with_sitout(mut self, sitout: Sitout) -> Self {
        self.sitout = Some(sitout);
        self
    }

    #[must_use]
    pub fn with_cards(mut self, cards: [CardIndex; 2]) -> Self {
        self.cards = Some(cards);
        self
    }
}

/// The highest last-receipt contribution found in a scan, and who made it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MaxBet {
    pub pos: SeatIndex,
    pub amount: Chips,
}

/// One (side) pot: contributions up to `limit` per seat, the seats still
/// eligible to win it, and, once resolved, the seats that did.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub limit: Chips,
    pub size: Chips,
    pub challengers: Vec<SeatIndex>,
    pub winners: Vec<SeatIndex>,
}

/// Payout map from account address to chips won. Zero-amount entries are
/// omitted; the rake address appears whenever any rake or rounding
/// remainder accrued.
pub type Distribution = BTreeMap<Address, Chips>;
