//! Process-wide trade id issuance.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ledger::types::TradeId;

/// Hands out a fresh [`TradeId`] per purchase call.
///
/// Ids are strictly increasing for the lifetime of the allocator. The counter
/// starts at a random offset so a restarted process does not collide with the
/// previous run's low ids; the randomness carries no security meaning.
pub struct TradeIdAllocator {
    next: AtomicU64,
}

impl TradeIdAllocator {
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random_range(1..100_000))
    }

    /// Start issuing at a known id. Used by deterministic tests.
    pub fn with_seed(first_id: u64) -> Self {
        Self {
            next: AtomicU64::new(first_id.max(1)),
        }
    }

    pub fn next_id(&self) -> TradeId {
        TradeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TradeIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
