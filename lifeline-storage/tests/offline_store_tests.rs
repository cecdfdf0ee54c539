//! Offline Store Recovery Tests
//!
//! The persistent tier misbehaves (quota exhaustion, corruption, I/O errors)
//! and the store must keep answering without surfacing an error.

use std::sync::Arc;
use std::time::Duration;

use lifeline_core::{ManualClock, OfflineStoreConfig};
use lifeline_storage::{KeyValueStore, LmdbKeyValueStore, OfflineStore};
use lifeline_test_utils::{arb_cache_entry, arb_cache_key, CorruptingStore, QuotaLimitedStore};
use proptest::prelude::*;
use tempfile::TempDir;

fn open(persistent: Arc<dyn KeyValueStore>, clock: Arc<ManualClock>) -> OfflineStore {
    OfflineStore::open_with_clock(OfflineStoreConfig::default(), persistent, clock)
        .expect("default config is valid")
}

#[test]
fn single_quota_failure_recovers_invisibly() {
    let persistent = Arc::new(QuotaLimitedStore::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let store = open(persistent.clone(), clock);

    persistent.fail_next_puts(1);
    store.set("k", &"v");

    assert_eq!(persistent.rejected(), 1);
    assert!(persistent.inner().get("lifeline:k").unwrap().is_some());
    assert_eq!(store.stats().quota_recoveries, 1);
    assert_eq!(store.get::<String>("k"), Some("v".to_string()));
}

#[test]
fn repeated_quota_failure_keeps_value_in_memory() {
    let persistent = Arc::new(QuotaLimitedStore::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let store = open(persistent.clone(), clock);

    persistent.fail_next_puts(2);
    store.set("k", &7u32);

    assert!(persistent.inner().is_empty());
    assert_eq!(store.stats().dropped_writes, 1);
    assert_eq!(store.get::<u32>("k"), Some(7));
}

#[test]
fn quota_purge_removes_only_invalid_entries() {
    let persistent = Arc::new(QuotaLimitedStore::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let store = open(persistent.clone(), clock.clone());

    store.set_with_ttl("short", &1u8, Duration::from_millis(5));
    store.set("long", &2u8);
    clock.advance(Duration::from_millis(10));

    persistent.fail_next_puts(1);
    store.set("fresh", &3u8);

    let inner = persistent.inner();
    assert!(inner.get("lifeline:short").unwrap().is_none());
    assert!(inner.get("lifeline:long").unwrap().is_some());
    assert!(inner.get("lifeline:fresh").unwrap().is_some());
}

#[test]
fn corrupt_reads_are_misses_and_purged() {
    let persistent = Arc::new(CorruptingStore::new());
    let clock = Arc::new(ManualClock::new(1_000));

    {
        let writer = open(persistent.clone(), clock.clone());
        writer.set("k", &"intact");
    }

    persistent.set_corrupt(true);
    let reader = open(persistent.clone(), clock);

    assert_eq!(reader.get::<String>("k"), None);
    assert!(persistent.inner().is_empty());
    assert_eq!(reader.stats().corrupt_purged, 1);
}

#[test]
fn backend_write_errors_are_swallowed() {
    let persistent = Arc::new(CorruptingStore::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let store = open(persistent.clone(), clock);

    persistent.set_corrupt(true);
    store.set("k", &"only in memory");

    assert_eq!(store.stats().dropped_writes, 1);
    assert_eq!(store.stats().quota_recoveries, 0);
    assert_eq!(store.get::<String>("k"), Some("only in memory".to_string()));
}

#[test]
fn lmdb_tier_survives_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Arc::new(ManualClock::new(1_000));

    {
        let persistent = Arc::new(LmdbKeyValueStore::open(dir.path(), 10).unwrap());
        let store = open(persistent, clock.clone());
        store.set("session", &vec!["a", "b"]);
    }

    let persistent = Arc::new(LmdbKeyValueStore::open(dir.path(), 10).unwrap());
    let store = open(persistent, clock);
    assert_eq!(
        store.get::<Vec<String>>("session"),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(store.stats().persistent_hits, 1);
}

#[test]
fn version_bump_invalidates_lmdb_entries() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Arc::new(ManualClock::new(1_000));

    {
        let persistent = Arc::new(LmdbKeyValueStore::open(dir.path(), 10).unwrap());
        let store = open(persistent, clock.clone());
        store.set("k", &1u32);
    }

    let persistent = Arc::new(LmdbKeyValueStore::open(dir.path(), 10).unwrap());
    let store = OfflineStore::open_with_clock(
        OfflineStoreConfig::default().with_store_version("1.0.1"),
        persistent.clone(),
        clock,
    )
    .unwrap();

    assert_eq!(store.get::<u32>("k"), None);
    assert!(persistent.keys_with_prefix("lifeline:").unwrap().is_empty());
}

proptest! {
    /// Whatever was persisted, a read never returns an entry the validity rule rejects.
    #[test]
    fn prop_reads_respect_validity(
        key in arb_cache_key(),
        mut entry in arb_cache_entry(),
        same_version in any::<bool>(),
        offset in -100_000_000i64..100_000_000,
    ) {
        if same_version {
            entry.version = "1.0.0".to_string();
        }
        let now = entry.timestamp.saturating_add(offset).max(0);

        let persistent = Arc::new(QuotaLimitedStore::new());
        let bytes = serde_json::to_vec(&entry).unwrap();
        persistent.put(&format!("lifeline:{}", key), &bytes).unwrap();

        let clock = Arc::new(ManualClock::new(now));
        let store = open(persistent, clock);
        let read = store.get::<serde_json::Value>(&key);

        let expected = entry.is_valid("1.0.0", now).then(|| entry.data.clone());
        prop_assert_eq!(read, expected);
    }
}
