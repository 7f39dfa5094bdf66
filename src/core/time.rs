//! Wall-clock time for record timestamps.
//!
//! WallClock is a measurement (unix milliseconds), not an ordering
//! primitive; draw ordering comes from the store, never from clocks.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Unix-epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallClock(pub u64);

impl WallClock {
    pub fn now() -> Self {
        if let Some(source) = test_source() {
            return Self(source.now_ms());
        }
        use std::time::{SystemTime, UNIX_EPOCH};
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }
}

/// Overridable clock source so tests can pin timestamps.
pub trait WallClockSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

static TEST_SOURCE: RwLock<Option<Arc<dyn WallClockSource>>> = RwLock::new(None);

fn test_source() -> Option<Arc<dyn WallClockSource>> {
    TEST_SOURCE.read().ok().and_then(|s| s.clone())
}

/// Install a clock source; restored to the real clock on guard drop.
pub fn set_wall_clock_source_for_tests(source: Arc<dyn WallClockSource>) -> WallClockGuard {
    if let Ok(mut slot) = TEST_SOURCE.write() {
        *slot = Some(source);
    }
    WallClockGuard { _private: () }
}

pub struct WallClockGuard {
    _private: (),
}

impl Drop for WallClockGuard {
    fn drop(&mut self) {
        if let Ok(mut slot) = TEST_SOURCE.write() {
            *slot = None;
        }
    }
}
