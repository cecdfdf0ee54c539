//! Cache entries and their validity rules.

use crate::clock::{duration_to_millis, EpochMillis};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value stamped with when it was written, how long it lives and
/// the store version it was written under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Write time, epoch milliseconds.
    pub timestamp: EpochMillis,
    /// Lifetime in milliseconds.
    pub ttl: u64,
    pub version: String,
}

/// Outcome of checking an entry against the current store version and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Expired,
    VersionMismatch,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: EpochMillis, ttl: Duration, version: impl Into<String>) -> Self {
        Self {
            data,
            timestamp,
            ttl: duration_to_millis(ttl),
            version: version.into(),
        }
    }

    /// Last instant (inclusive) at which the entry is still live.
    pub fn expires_at(&self) -> EpochMillis {
        let ttl = i64::try_from(self.ttl).unwrap_or(i64::MAX);
        self.timestamp.saturating_add(ttl)
    }

    /// Valid iff the version matches and `now <= timestamp + ttl`.
    /// A version mismatch wins over expiry.
    pub fn validity(&self, current_version: &str, now: EpochMillis) -> Validity {
        if self.version != current_version {
            Validity::VersionMismatch
        } else if now > self.expires_at() {
            Validity::Expired
        } else {
            Validity::Valid
        }
    }

    pub fn is_valid(&self, current_version: &str, now: EpochMillis) -> bool {
        self.validity(current_version, now).is_valid()
    }
}
