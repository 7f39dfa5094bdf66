//! Test support: deterministic clocks, seeded RNGs and fault injection.
//!
//! Lives in the library (not `tests/`) so unit tests and integration
//! tests share one set of fixtures.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::{
    CatalogSnapshot, DrawRecord, Prize, PrizeId, WallClockSource,
};
use crate::store::{CatalogSubscription, Store, StoreError};

/// Fixed-seed RNG so weighted-selection tests are reproducible.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Manually advanced wall clock.
#[derive(Clone)]
pub struct TestClock {
    now: Arc<AtomicU64>,
}

impl TestClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl WallClockSource for TestClock {
    fn now_ms(&self) -> u64 {
        TestClock::now_ms(self)
    }
}

/// Store wrapper that injects `Unavailable` failures on demand.
///
/// `fail_next(n)` makes the next `n` non-append operations fail;
/// `fail_appends(n)` targets only ledger appends, which is how the
/// decremented-but-unrecorded inconsistency window gets exercised.
pub struct FaultyStore<S> {
    inner: S,
    fail_ops: AtomicU32,
    fail_appends: AtomicU32,
}

impl<S: Store> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_ops: AtomicU32::new(0),
            fail_appends: AtomicU32::new(0),
        }
    }

    pub fn fail_next(&self, n: u32) {
        self.fail_ops.store(n, Ordering::SeqCst);
    }

    pub fn fail_appends(&self, n: u32) {
        self.fail_appends.store(n, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn maybe_fail(&self, counter: &AtomicU32, op: &str) -> Result<(), StoreError> {
        let armed = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            Err(StoreError::Unavailable {
                reason: format!("injected fault during {op}"),
            })
        } else {
            Ok(())
        }
    }
}

impl<S: Store> Store for FaultyStore<S> {
    fn catalog(&self) -> Result<CatalogSnapshot, StoreError> {
        self.maybe_fail(&self.fail_ops, "catalog")?;
        self.inner.catalog()
    }

    fn decrement_stock(&self, id: &PrizeId) -> Result<Prize, StoreError> {
        self.maybe_fail(&self.fail_ops, "decrement_stock")?;
        self.inner.decrement_stock(id)
    }

    fn draw_count(&self) -> Result<u64, StoreError> {
        self.maybe_fail(&self.fail_ops, "draw_count")?;
        self.inner.draw_count()
    }

    fn increment_draw_count(&self) -> Result<u64, StoreError> {
        self.maybe_fail(&self.fail_ops, "increment_draw_count")?;
        self.inner.increment_draw_count()
    }

    fn append_record(&self, record: DrawRecord) -> Result<(), StoreError> {
        self.maybe_fail(&self.fail_appends, "append_record")?;
        self.maybe_fail(&self.fail_ops, "append_record")?;
        self.inner.append_record(record)
    }

    fn records(&self) -> Result<Vec<DrawRecord>, StoreError> {
        self.inner.records()
    }

    fn replace_catalog(&self, prizes: Vec<Prize>) -> Result<u64, StoreError> {
        self.maybe_fail(&self.fail_ops, "replace_catalog")?;
        self.inner.replace_catalog(prizes)
    }

    fn reset(&self, prizes: Vec<Prize>) -> Result<(), StoreError> {
        self.maybe_fail(&self.fail_ops, "reset")?;
        self.inner.reset(prizes)
    }

    fn subscribe(&self) -> Result<CatalogSubscription, StoreError> {
        self.inner.subscribe()
    }
}
