//! Catalog change fanout to live draw sessions.
//!
//! Admin edits and resets must reach every active session without polling,
//! so the store publishes each new catalog version here. Writers never
//! block on readers: a subscriber that stops draining its queue is dropped
//! and can tell from `drop_reason` that it must re-fetch a snapshot.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crossbeam::channel::{Receiver, Sender, TryRecvError, TrySendError};
use thiserror::Error;

use crate::core::CatalogSnapshot;

/// One published catalog change.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEvent {
    pub snapshot: CatalogSnapshot,
}

impl CatalogEvent {
    pub fn version(&self) -> u64 {
        self.snapshot.version
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BroadcastError {
    #[error("subscriber limit reached ({max_subscribers})")]
    SubscriberLimitReached { max_subscribers: usize },
    #[error("broadcast state lock poisoned")]
    LockPoisoned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcasterLimits {
    pub max_subscribers: usize,
    /// Per-subscriber queue capacity; a full queue drops the subscriber.
    pub queue_capacity: usize,
}

impl Default for BroadcasterLimits {
    fn default() -> Self {
        Self {
            max_subscribers: 1024,
            queue_capacity: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    SubscriberLagged,
}

/// Receiving half handed to a session.
#[derive(Debug)]
pub struct CatalogSubscription {
    receiver: Receiver<CatalogEvent>,
    drop_reason: Arc<Mutex<Option<DropReason>>>,
}

impl CatalogSubscription {
    pub fn recv(&self) -> Result<CatalogEvent, crossbeam::channel::RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<CatalogEvent, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Set when the broadcaster dropped this subscriber for lagging.
    pub fn drop_reason(&self) -> Option<DropReason> {
        self.drop_reason.lock().ok().and_then(|guard| *guard)
    }
}

#[derive(Clone)]
pub struct CatalogBroadcaster {
    inner: Arc<Mutex<BroadcasterState>>,
}

impl CatalogBroadcaster {
    pub fn new(limits: BroadcasterLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BroadcasterState {
                limits,
                next_subscriber_id: 0,
                subscribers: BTreeMap::new(),
            })),
        }
    }

    pub fn subscribe(&self) -> Result<CatalogSubscription, BroadcastError> {
        let mut state = self.lock_state()?;
        if state.subscribers.len() >= state.limits.max_subscribers {
            return Err(BroadcastError::SubscriberLimitReached {
                max_subscribers: state.limits.max_subscribers,
            });
        }

        let (sender, receiver) = crossbeam::channel::bounded(state.limits.queue_capacity);
        let drop_reason = Arc::new(Mutex::new(None));
        let id = state.next_subscriber_id;
        state.next_subscriber_id = state.next_subscriber_id.saturating_add(1);
        state.subscribers.insert(
            id,
            SubscriberState {
                sender,
                drop_reason: Arc::clone(&drop_reason),
            },
        );

        Ok(CatalogSubscription {
            receiver,
            drop_reason,
        })
    }

    pub fn publish(&self, event: CatalogEvent) -> Result<(), BroadcastError> {
        let mut state = self.lock_state()?;

        let mut dropped = Vec::new();
        for (id, subscriber) in &state.subscribers {
            match subscriber.sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    subscriber.set_drop_reason(DropReason::SubscriberLagged);
                    dropped.push(*id);
                }
                Err(TrySendError::Disconnected(_)) => {
                    dropped.push(*id);
                }
            }
        }

        for id in dropped {
            state.subscribers.remove(&id);
        }

        Ok(())
    }

    pub fn subscriber_count(&self) -> Result<usize, BroadcastError> {
        Ok(self.lock_state()?.subscribers.len())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, BroadcasterState>, BroadcastError> {
        self.inner.lock().map_err(|_| BroadcastError::LockPoisoned)
    }
}

struct BroadcasterState {
    limits: BroadcasterLimits,
    next_subscriber_id: u64,
    subscribers: BTreeMap<u64, SubscriberState>,
}

struct SubscriberState {
    sender: Sender<CatalogEvent>,
    drop_reason: Arc<Mutex<Option<DropReason>>>,
}

impl SubscriberState {
    fn set_drop_reason(&self, reason: DropReason) {
        if let Ok(mut guard) = self.drop_reason.lock() {
            guard.get_or_insert(reason);
        }
    }
}
