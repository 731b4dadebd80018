use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while encoding, signing, or parsing receipts. All are
/// non-retryable logic errors signaling a violated precondition.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ReceiptError {
    /// The recovered signer does not match the encoded hint, or the
    /// signature itself does not recover to a public key.
    #[error("signature verification failed")]
    SignatureVerificationFailed,
    #[error("unknown receipt type: {0}")]
    UnknownReceiptType(u8),
    /// The encoding could not be decoded into head/body/tail segments of
    /// the expected shape.
    #[error("malformed receipt: {0}")]
    Malformed(String),
    #[error("invalid signing key")]
    InvalidKey,
}
