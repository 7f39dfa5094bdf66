//! Core domain types: identities, prizes, records, time.
//!
//! Pure data plus validation. Nothing in here touches the store or does
//! I/O; the coordinator and store layers build on these.

pub mod error;
pub mod identity;
pub mod prize;
pub mod record;
pub mod time;

pub use error::{CoreError, InvalidCatalog, InvalidId, InvalidPrize, InvalidTier};
pub use identity::{ParticipantId, PrizeId, RecordId};
pub use prize::{CatalogSnapshot, Prize, Tier, validate_catalog};
pub use record::DrawRecord;
pub use time::{WallClock, WallClockGuard, WallClockSource, set_wall_clock_source_for_tests};
