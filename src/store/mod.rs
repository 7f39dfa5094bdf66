//! The Store collaborator: shared mutable state behind atomic primitives.
//!
//! PrizeCatalog and DrawCount are the only shared mutable resources in the
//! system, and every mutation goes through this trait. The critical
//! primitive is `decrement_stock`: an atomic conditional decrement whose
//! precondition (stock > 0) is evaluated at commit time, which is what
//! keeps concurrent draws from overselling. Nothing in the engine may
//! read-modify-write catalog state outside these operations.

mod broadcast;
mod memory;

use thiserror::Error;

use crate::core::{CatalogSnapshot, DrawRecord, Prize, PrizeId};
use crate::error::{Effect, Transience};

pub use broadcast::{
    BroadcastError, BroadcasterLimits, CatalogBroadcaster, CatalogEvent, CatalogSubscription,
    DropReason,
};
pub use memory::MemoryStore;

/// Store operation failures.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StoreError {
    /// Backend unreachable or mid-operation failure. The caller may retry
    /// the whole draw; side effects of the failed call are unknown.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The conditional decrement found the prize already at zero stock.
    /// Expected under concurrency; the coordinator retries internally.
    #[error("stock conflict on prize `{id}`: no stock at commit time")]
    StockConflict { id: PrizeId },

    /// The prize id does not exist in the catalog.
    #[error("unknown prize `{id}`")]
    UnknownPrize { id: PrizeId },

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}

impl StoreError {
    pub fn transience(&self) -> Transience {
        match self {
            StoreError::Unavailable { .. } | StoreError::StockConflict { .. } => {
                Transience::Retryable
            }
            StoreError::UnknownPrize { .. } | StoreError::Broadcast(_) => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            // The backend may or may not have applied the write before the
            // failure surfaced.
            StoreError::Unavailable { .. } => Effect::Unknown,
            StoreError::StockConflict { .. }
            | StoreError::UnknownPrize { .. }
            | StoreError::Broadcast(_) => Effect::None,
        }
    }
}

/// Consistency contract every backing store must honor.
///
/// Implementations must be safe to call from many threads at once. The
/// engine ships [`MemoryStore`] as the reference implementation; a real
/// deployment substitutes a networked backend with the same semantics.
pub trait Store: Send + Sync {
    /// Internally consistent point-in-time view of the full catalog.
    fn catalog(&self) -> Result<CatalogSnapshot, StoreError>;

    /// Atomic conditional decrement: take one unit of `id` iff its stock
    /// is still positive at commit time. Returns the post-decrement prize
    /// so the caller can snapshot display fields for the ledger.
    ///
    /// All-or-nothing even when the caller goes away mid-call: either the
    /// decrement committed or it did not, never a partial effect.
    fn decrement_stock(&self, id: &PrizeId) -> Result<Prize, StoreError>;

    /// Current global draw count. May be slightly stale relative to
    /// in-flight increments; the unlock gate only needs it approximately
    /// monotonic.
    fn draw_count(&self) -> Result<u64, StoreError>;

    /// Atomic increment of the global draw count; returns the new value.
    fn increment_draw_count(&self) -> Result<u64, StoreError>;

    /// Append one audit record. Never mutates existing records.
    fn append_record(&self, record: DrawRecord) -> Result<(), StoreError>;

    /// All audit records in append order.
    fn records(&self) -> Result<Vec<DrawRecord>, StoreError>;

    /// Swap in a validated catalog; bumps the snapshot version and
    /// publishes the change to subscribers. Returns the new version.
    fn replace_catalog(&self, prizes: Vec<Prize>) -> Result<u64, StoreError>;

    /// Full administrative reset: default catalog back in, draw count to
    /// zero, records cleared. Atomic from the caller's point of view.
    fn reset(&self, prizes: Vec<Prize>) -> Result<(), StoreError>;

    /// Subscribe to catalog changes (admin edits, resets). Used for live
    /// sync so sessions see operator edits without polling.
    fn subscribe(&self) -> Result<CatalogSubscription, StoreError>;
}
