//! # Poker Referee
//!
//! Adjudicates a single hand of multi-seat poker played by mutually
//! distrusting parties who exchange cryptographically signed receipts as
//! the only evidence of actions taken.
//!
//! Everything here is a pure computation over a caller-owned snapshot: a
//! lineup of seats, the current street, and a dealer index. The crate never
//! mutates a seat and keeps no state across calls except the content-
//! addressed [`ReceiptCache`].
//!
//! ## Core Modules
//!
//! - [`receipt`]: Receipt wire codec, ECDSA signer/recovery, and the parse
//!   cache
//! - [`table`]: Seat activity, turn resolution, betting-round and hand
//!   completion, and side-pot distribution
//! - [`eval`]: 7-card hand ranking behind the [`HandEvaluator`] seam
//!
//! ## Example
//!
//! ```
//! use poker_referee::{
//!     Receipt, ReceiptCache, ReceiptKind, ReceiptSigner, Seat, Street, table::lineup,
//! };
//!
//! let signer = ReceiptSigner::from_bytes(&[7; 32]).unwrap();
//! let encoded = signer.sign_action(ReceiptKind::Bet, 1, 50).unwrap();
//! assert_eq!(Receipt::parse(&encoded).unwrap().signer(), signer.address());
//!
//! // Dealer 1; only seat 2 has posted, so seat 0 is next to act.
//! let cache = ReceiptCache::new();
//! let lineup = vec![
//!     Seat::taken(signer.address()),
//!     Seat::taken(signer.address()),
//!     Seat::taken(signer.address()).with_last(encoded),
//! ];
//! let turn = lineup::whos_turn(&lineup, &cache, 1, Street::Dealing, None).unwrap();
//! assert_eq!(turn, 0);
//! ```

/// Receipt wire format, signing, recovery, and caching.
pub mod receipt;
pub use receipt::{Receipt, ReceiptCache, ReceiptError, ReceiptKind, ReceiptSigner};

/// Lineup state machine and pot distribution.
pub mod table;
pub use table::{
    Address, Chips, Distribution, MaxBet, Pot, Seat, SeatIndex, Sitout, Street, TableError,
    calc_distribution,
};

/// Card types and hand ranking.
pub mod eval;
pub use eval::{Card, HandEvaluator, HandRank, NativeEvaluator, RankedHand};
