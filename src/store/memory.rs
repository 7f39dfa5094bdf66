//! In-process reference store.
//!
//! One mutex over the whole state gives the three properties the contract
//! demands for free: snapshots are internally consistent, the conditional
//! decrement is atomic, and reset is all-or-nothing. Catalog version bumps
//! on every mutation; only administrative mutations (replace/reset) are
//! published to subscribers, stock decrements are not.

use std::sync::Mutex;

use crate::core::{CatalogSnapshot, DrawRecord, Prize, PrizeId, validate_catalog};

use super::broadcast::{
    BroadcasterLimits, CatalogBroadcaster, CatalogEvent, CatalogSubscription,
};
use super::{Store, StoreError};

pub struct MemoryStore {
    state: Mutex<State>,
    broadcaster: CatalogBroadcaster,
}

struct State {
    prizes: Vec<Prize>,
    version: u64,
    draw_count: u64,
    records: Vec<DrawRecord>,
}

impl MemoryStore {
    /// Seed with an already-validated catalog (config defaults or an
    /// admin-supplied set).
    pub fn new(prizes: Vec<Prize>) -> Self {
        Self::with_limits(prizes, BroadcasterLimits::default())
    }

    pub fn with_limits(prizes: Vec<Prize>, limits: BroadcasterLimits) -> Self {
        Self {
            state: Mutex::new(State {
                prizes,
                version: 1,
                draw_count: 0,
                records: Vec::new(),
            }),
            broadcaster: CatalogBroadcaster::new(limits),
        }
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Unavailable {
            reason: "state lock poisoned".into(),
        })
    }
}

impl State {
    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::new(self.version, self.prizes.clone())
    }
}

impl Store for MemoryStore {
    fn catalog(&self) -> Result<CatalogSnapshot, StoreError> {
        Ok(self.lock_state()?.snapshot())
    }

    fn decrement_stock(&self, id: &PrizeId) -> Result<Prize, StoreError> {
        let mut state = self.lock_state()?;
        let prize = state
            .prizes
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::UnknownPrize { id: id.clone() })?;
        if prize.current_stock == 0 {
            return Err(StoreError::StockConflict { id: id.clone() });
        }
        prize.current_stock -= 1;
        let awarded = prize.clone();
        state.version += 1;
        Ok(awarded)
    }

    fn draw_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock_state()?.draw_count)
    }

    fn increment_draw_count(&self) -> Result<u64, StoreError> {
        let mut state = self.lock_state()?;
        state.draw_count += 1;
        Ok(state.draw_count)
    }

    fn append_record(&self, record: DrawRecord) -> Result<(), StoreError> {
        self.lock_state()?.records.push(record);
        Ok(())
    }

    fn records(&self) -> Result<Vec<DrawRecord>, StoreError> {
        Ok(self.lock_state()?.records.clone())
    }

    fn replace_catalog(&self, prizes: Vec<Prize>) -> Result<u64, StoreError> {
        debug_assert!(validate_catalog(&prizes).is_ok(), "unvalidated catalog");
        let snapshot = {
            let mut state = self.lock_state()?;
            state.prizes = prizes;
            state.version += 1;
            state.snapshot()
        };
        let version = snapshot.version;
        self.broadcaster.publish(CatalogEvent { snapshot })?;
        Ok(version)
    }

    fn reset(&self, prizes: Vec<Prize>) -> Result<(), StoreError> {
        debug_assert!(validate_catalog(&prizes).is_ok(), "unvalidated catalog");
        let snapshot = {
            let mut state = self.lock_state()?;
            state.prizes = prizes;
            state.version += 1;
            state.draw_count = 0;
            state.records.clear();
            state.snapshot()
        };
        self.broadcaster.publish(CatalogEvent { snapshot })?;
        Ok(())
    }

    fn subscribe(&self) -> Result<CatalogSubscription, StoreError> {
        Ok(self.broadcaster.subscribe()?)
    }
}
