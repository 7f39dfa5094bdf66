#![forbid(unsafe_code)]

pub mod admin;
pub mod alloc;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod ledger;
pub mod store;
pub mod telemetry;
pub mod test_harness;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::alloc::Allocation;
pub use crate::config::{Config, PrizeSeed};
pub use crate::coordinator::{Award, DrawCoordinator, DrawError, DrawOutcome};
pub use crate::core::{
    CatalogSnapshot, CoreError, DrawRecord, ParticipantId, Prize, PrizeId, RecordId, Tier,
    WallClock,
};
pub use crate::ledger::RecordLedger;
pub use crate::store::{CatalogEvent, CatalogSubscription, MemoryStore, Store, StoreError};
