//! Signed action receipts: wire codec, signer, and parse cache.

pub mod cache;
pub mod codec;
pub mod errors;

pub use cache::ReceiptCache;
pub use codec::{
    ActionPayload, DistributionPayload, LeavePayload, Receipt, ReceiptKind, ReceiptSig,
    ReceiptSigner,
};
pub use errors::ReceiptError;
