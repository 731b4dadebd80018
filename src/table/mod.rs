//! Lineup adjudication: seat activity, turn order, betting-round and hand
//! completion, and side-pot settlement.

pub mod entities;
pub mod errors;
pub mod lineup;
pub mod payout;

pub use entities::{Address, Chips, Distribution, MaxBet, Pot, Seat, SeatIndex, Sitout, Street};
pub use errors::TableError;
pub use payout::calc_distribution;
