//! Offline store counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of offline store activity at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads answered by the memory tier
    pub memory_hits: u64,
    /// Reads answered by the persistent tier (memory was repopulated)
    pub persistent_hits: u64,
    /// Reads that found nothing valid in either tier
    pub misses: u64,
    /// Values produced by a generator after a miss
    pub generated: u64,
    /// Entries discarded for expiry or version mismatch
    pub expired_purged: u64,
    /// Persisted entries discarded because they could not be parsed
    pub corrupt_purged: u64,
    /// Persistent writes that succeeded after a quota purge
    pub quota_recoveries: u64,
    /// Persistent writes given up on; the memory tier still holds the value
    pub dropped_writes: u64,
}

impl CacheStats {
    /// Fraction of reads served from either tier (0.0 when nothing was read).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.persistent_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Live counters backing [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    pub memory_hits: AtomicU64,
    pub persistent_hits: AtomicU64,
    pub misses: AtomicU64,
    pub generated: AtomicU64,
    pub expired_purged: AtomicU64,
    pub corrupt_purged: AtomicU64,
    pub quota_recoveries: AtomicU64,
    pub dropped_writes: AtomicU64,
}

impl StatsRecorder {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            generated: self.generated.load(Ordering::Relaxed),
            expired_purged: self.expired_purged.load(Ordering::Relaxed),
            corrupt_purged: self.corrupt_purged.load(Ordering::Relaxed),
            quota_recoveries: self.quota_recoveries.load(Ordering::Relaxed),
            dropped_writes: self.dropped_writes.load(Ordering::Relaxed),
        }
    }
}
