//! Memoized receipt parsing.
//!
//! Lineup scans dereference the same encoded receipts over and over; the
//! cache makes repeat lookups a hash map hit instead of a base64 decode
//! plus a signature recovery.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use super::{codec::Receipt, errors::ReceiptError};

/// A shared parse cache keyed by the encoded receipt string. Entries are
/// only inserted after a successful parse, so a cache hit is always a
/// verified receipt. Failed parses are not cached; a garbage string costs
/// a full parse attempt each time.
#[derive(Debug, Default)]
pub struct ReceiptCache {
    entries: RwLock<HashMap<String, Arc<Receipt>>>,
}

impl ReceiptCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an encoded receipt, parsing and caching it on first sight.
    /// An empty string resolves to `Ok(None)` rather than a parse error so
    /// callers can pass a seat's `last` field through unconditionally.
    pub fn get(&self, encoded: &str) -> Result<Option<Arc<Receipt>>, ReceiptError> {
        if encoded.is_empty() {
            return Ok(None);
        }
        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(receipt) = entries.get(encoded) {
                return Ok(Some(Arc::clone(receipt)));
            }
        }
        let receipt = Arc::new(Receipt::parse(encoded)?);
        log::debug!(
            "cached {} receipt for hand {} from {}",
            receipt.kind(),
            receipt.hand_id(),
            receipt.signer()
        );
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(encoded.to_string(), Arc::clone(&receipt));
        Ok(Some(receipt))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::codec::{ReceiptKind, ReceiptSigner};

    #[test]
    fn test_empty_string_is_none() {
        let cache = ReceiptCache::new();
        assert_eq!(cache.get("").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_returns_same_receipt() {
        let signer = ReceiptSigner::from_bytes(&[1; 32]).unwrap();
        let encoded = signer.sign_action(ReceiptKind::Bet, 1, 100).unwrap();
        let cache = ReceiptCache::new();
        let first = cache.get(&encoded).unwrap().unwrap();
        let second = cache.get(&encoded).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_parse_failures_not_cached() {
        let cache = ReceiptCache::new();
        assert!(cache.get("not.a.receipt").is_err());
        assert!(cache.is_empty());
    }
}
