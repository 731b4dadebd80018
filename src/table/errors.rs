use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::receipt::ReceiptError;

/// Errors surfaced while adjudicating a lineup snapshot.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    /// The caller handed over a snapshot that violates a precondition
    /// (too few seats, dealer out of range, missing board or hole cards).
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// No seat in the lineup is active.
    #[error("no active player")]
    NoActivePlayer,
    /// Betting on this street is complete; nobody is due to act.
    #[error("no one's turn")]
    NoOnesTurn,
    /// Preflop turn resolution needs the big blind amount and none was
    /// supplied.
    #[error("undefined big blind amount")]
    UndefinedBbAmount,
    /// No seat in the scan range holds a receipt to take the max bet from.
    #[error("could not find max bet")]
    CouldNotFindMaxBet,
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}
