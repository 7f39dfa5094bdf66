//! Draw orchestration: one logical draw from request to committed award.
//!
//! The coordinator owns the optimistic-concurrency loop. Allocation runs
//! against a possibly-stale snapshot; the store's conditional decrement is
//! the commit point that validates the choice. Losing that race is normal
//! and recovered internally with a fresh snapshot, up to a bounded number
//! of attempts. No locks are held across allocation.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use crate::alloc::{self, Allocation};
use crate::core::{DrawRecord, ParticipantId, Prize};
use crate::error::{Effect, Transience};
use crate::store::{Store, StoreError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A committed award.
#[derive(Clone, Debug, PartialEq)]
pub struct Award {
    /// The awarded prize as of the commit (post-decrement stock).
    pub prize: Prize,
    /// Ledger entry for this award. `None` means the append failed after
    /// the stock decrement had already committed: the award stands, the
    /// gap is logged for operators, and stock is never restored (a
    /// compensating restore could double-spend against a concurrent draw).
    pub record: Option<DrawRecord>,
}

/// Terminal result of one logical draw. Exhaustion is a well-defined
/// outcome, not an error: once every prize is at zero stock the engine
/// keeps answering `SoldOut` without ever panicking.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    Awarded(Award),
    SoldOut,
}

/// Failures that escape to the caller.
///
/// Stock conflicts never appear here; they are retried away internally.
/// What remains is backend unavailability, which the caller may safely
/// retry from the top because no award was committed.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum DrawError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DrawError {
    pub fn transience(&self) -> Transience {
        match self {
            DrawError::Store(e) => e.transience(),
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            DrawError::Store(e) => e.effect(),
        }
    }
}

pub struct DrawCoordinator<S> {
    store: Arc<S>,
    unlock_threshold: u64,
    max_attempts: u32,
}

impl<S: Store> DrawCoordinator<S> {
    pub fn new(store: Arc<S>, unlock_threshold: u64) -> Self {
        Self {
            store,
            unlock_threshold,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the retry budget for lost stock races. Clamped to >= 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Perform one draw for `participant`.
    pub fn draw(&self, participant: ParticipantId) -> Result<DrawOutcome, DrawError> {
        self.draw_with_rng(participant, &mut rand::rng())
    }

    /// Like [`draw`](Self::draw) with an injected RNG, so tests can drive
    /// the weighted selection deterministically.
    pub fn draw_with_rng<R: Rng + ?Sized>(
        &self,
        participant: ParticipantId,
        rng: &mut R,
    ) -> Result<DrawOutcome, DrawError> {
        // A slightly stale count is fine: the unlock gate only needs to be
        // approximately monotonic.
        let draw_count = self.store.draw_count()?;

        for attempt in 1..=self.max_attempts {
            let snapshot = self.store.catalog()?;
            let candidate =
                match alloc::select(&snapshot, draw_count, self.unlock_threshold, rng) {
                    Allocation::Picked(id) => id,
                    Allocation::Exhausted => return Ok(DrawOutcome::SoldOut),
                };

            match self.store.decrement_stock(&candidate) {
                Ok(awarded) => return Ok(self.commit(participant, awarded)),
                Err(StoreError::StockConflict { id }) => {
                    tracing::debug!(
                        prize = %id,
                        attempt,
                        catalog_version = snapshot.version,
                        "lost stock race, retrying with fresh snapshot"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!(
            participant = %participant,
            attempts = self.max_attempts,
            "retry budget exhausted, treating draw as sold out"
        );
        Ok(DrawOutcome::SoldOut)
    }

    /// The decrement has committed; nothing past this point may undo it.
    fn commit(&self, participant: ParticipantId, prize: Prize) -> DrawOutcome {
        if let Err(err) = self.store.increment_draw_count() {
            // Unlock timing skews slightly; tolerable and worth surfacing.
            tracing::error!(
                prize = %prize.id,
                error = %err,
                "draw counter increment failed after committed decrement"
            );
        }

        let record = DrawRecord::for_award(participant, &prize);
        let record = match self.store.append_record(record.clone()) {
            Ok(()) => Some(record),
            Err(err) => {
                tracing::error!(
                    prize = %prize.id,
                    error = %err,
                    "ledger append failed; award stands, stock stays decremented"
                );
                None
            }
        };

        tracing::info!(prize = %prize.id, tier = %prize.tier, "prize awarded");
        DrawOutcome::Awarded(Award { prize, record })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::core::{PrizeId, Tier};
    use crate::store::MemoryStore;
    use crate::test_harness::FaultyStore;

    fn prize(id: &str, tier: Tier, weight: f64, stock: u32) -> Prize {
        Prize::new(
            PrizeId::parse(id).unwrap(),
            tier,
            weight,
            stock,
            format!("prize {id}"),
            "desc",
        )
        .unwrap()
    }

    fn participant() -> ParticipantId {
        ParticipantId::new("tester").unwrap()
    }

    #[test]
    fn awards_and_records_one_draw() {
        let store = Arc::new(MemoryStore::new(vec![prize("coupon", Tier::C, 44.0, 10)]));
        let coordinator = DrawCoordinator::new(Arc::clone(&store), 50);
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = coordinator.draw_with_rng(participant(), &mut rng).unwrap();
        let award = match outcome {
            DrawOutcome::Awarded(award) => award,
            DrawOutcome::SoldOut => panic!("expected an award"),
        };
        assert_eq!(award.prize.current_stock, 9);
        assert_eq!(store.draw_count().unwrap(), 1);

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prize_id.as_str(), "coupon");
        assert_eq!(award.record.as_ref(), Some(&records[0]));
    }

    #[test]
    fn exhausted_catalog_is_sold_out_not_an_error() {
        let store = Arc::new(MemoryStore::new(vec![prize("coupon", Tier::C, 44.0, 0)]));
        let coordinator = DrawCoordinator::new(Arc::clone(&store), 50);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5 {
            let outcome = coordinator.draw_with_rng(participant(), &mut rng).unwrap();
            assert_eq!(outcome, DrawOutcome::SoldOut);
        }
        assert!(store.records().unwrap().is_empty());
        assert_eq!(store.draw_count().unwrap(), 0);
    }

    #[test]
    fn store_outage_propagates_as_retryable_error() {
        let store = Arc::new(FaultyStore::new(MemoryStore::new(vec![prize(
            "coupon",
            Tier::C,
            44.0,
            10,
        )])));
        store.fail_next(1);
        let coordinator = DrawCoordinator::new(Arc::clone(&store), 50);
        let mut rng = StdRng::seed_from_u64(5);

        let err = coordinator
            .draw_with_rng(participant(), &mut rng)
            .expect_err("outage should surface");
        assert!(err.transience().is_retryable());
        // Nothing committed: no award, no stock movement.
        let snapshot = store.catalog().unwrap();
        assert_eq!(snapshot.prizes[0].current_stock, 10);
    }

    #[test]
    fn ledger_append_failure_keeps_award_and_decrement() {
        let store = Arc::new(FaultyStore::new(MemoryStore::new(vec![prize(
            "coupon",
            Tier::C,
            44.0,
            10,
        )])));
        store.fail_appends(1);
        let coordinator = DrawCoordinator::new(Arc::clone(&store), 50);
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = coordinator.draw_with_rng(participant(), &mut rng).unwrap();
        let award = match outcome {
            DrawOutcome::Awarded(award) => award,
            DrawOutcome::SoldOut => panic!("expected an award"),
        };
        // The documented inconsistency window: stock moved, no record.
        assert!(award.record.is_none());
        assert_eq!(store.catalog().unwrap().prizes[0].current_stock, 9);
        assert!(store.records().unwrap().is_empty());
    }
}
