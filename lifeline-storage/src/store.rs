//! Tiered offline store.
//!
//! Reads degrade through three tiers: the in-process memory map, the
//! persistent [`KeyValueStore`], and finally a caller-supplied generator.
//! Writes go to both tiers. Every read checks the entry's TTL and version
//! and purges what fails.
//!
//! # Errors
//!
//! Nothing in the storage tiers reaches the caller. Corrupt persisted
//! entries are misses, a quota failure triggers one purge-and-retry, and any
//! write that still fails is logged, counted and dropped while the memory
//! tier keeps the value.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use lifeline_core::{
    CacheEntry, Clock, LifelineResult, OfflineStoreConfig, StorageError, SystemClock, Validity,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::{InMemoryKeyValueStore, KeyValueStore};
use crate::network::{NetworkEvent, NetworkObserver};
use crate::stats::{CacheStats, StatsRecorder};

type ResyncHook = Arc<dyn Fn() + Send + Sync>;

/// Read-through, write-through cache with host connectivity tracking.
pub struct OfflineStore {
    config: OfflineStoreConfig,
    memory: Mutex<HashMap<String, CacheEntry<Value>>>,
    persistent: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    offline: AtomicBool,
    stats: StatsRecorder,
    resync_hooks: Mutex<Vec<ResyncHook>>,
    listener: Mutex<Option<Listener>>,
}

struct Listener {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OfflineStore {
    /// Open a store over `persistent` and sweep it once, purging entries that
    /// are expired, from another version, or unreadable.
    pub fn open(
        config: OfflineStoreConfig,
        persistent: Arc<dyn KeyValueStore>,
    ) -> LifelineResult<Self> {
        Self::open_with_clock(config, persistent, Arc::new(SystemClock))
    }

    /// Like [`open`](Self::open) with an explicit time source.
    pub fn open_with_clock(
        config: OfflineStoreConfig,
        persistent: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> LifelineResult<Self> {
        config.validate()?;

        let store = Self {
            config,
            memory: Mutex::new(HashMap::new()),
            persistent,
            clock,
            offline: AtomicBool::new(false),
            stats: StatsRecorder::default(),
            resync_hooks: Mutex::new(Vec::new()),
            listener: Mutex::new(None),
        };

        let purged = store.purge_expired();
        tracing::info!(
            purged,
            version = %store.config.store_version,
            prefix = %store.config.key_prefix,
            "Offline store opened"
        );

        Ok(store)
    }

    /// Store whose persistent tier lives only in this process.
    pub fn in_memory(config: OfflineStoreConfig) -> LifelineResult<Self> {
        Self::open(config, Arc::new(InMemoryKeyValueStore::new()))
    }

    pub fn config(&self) -> &OfflineStoreConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    fn persistent_key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    fn validity(&self, entry: &CacheEntry<Value>, now: i64) -> Validity {
        entry.validity(&self.config.store_version, now)
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Look up `key` in memory, then in the persistent tier.
    ///
    /// A persistent hit repopulates memory. Invalid entries found on the way
    /// are removed from the tier they were found in.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = self.clock.now_millis();

        let from_memory = {
            let mut memory = lock(&self.memory);
            match memory.get(key).map(|entry| self.validity(entry, now)) {
                Some(Validity::Valid) => memory.get(key).map(|entry| entry.data.clone()),
                Some(reason) => {
                    memory.remove(key);
                    StatsRecorder::bump(&self.stats.expired_purged);
                    tracing::debug!(key, ?reason, "Discarded stale memory entry");
                    None
                }
                None => None,
            }
        };

        if let Some(data) = from_memory {
            return match decode(key, data) {
                Ok(value) => {
                    StatsRecorder::bump(&self.stats.memory_hits);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cached value does not match requested type");
                    StatsRecorder::bump(&self.stats.misses);
                    None
                }
            };
        }

        match self.read_persistent(key, now) {
            Some(entry) => match decode(key, entry.data.clone()) {
                Ok(value) => {
                    lock(&self.memory).insert(key.to_string(), entry);
                    StatsRecorder::bump(&self.stats.persistent_hits);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cached value does not match requested type");
                    StatsRecorder::bump(&self.stats.misses);
                    None
                }
            },
            None => {
                StatsRecorder::bump(&self.stats.misses);
                None
            }
        }
    }

    /// Valid persisted entry for `key`, purging it if it is invalid or corrupt.
    fn read_persistent(&self, key: &str, now: i64) -> Option<CacheEntry<Value>> {
        let persistent_key = self.persistent_key(key);
        let bytes = match self.persistent.get(&persistent_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Persistent tier read failed");
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry<Value>>(&bytes) {
            Ok(entry) => match self.validity(&entry, now) {
                Validity::Valid => Some(entry),
                reason => {
                    self.remove_persistent(&persistent_key);
                    StatsRecorder::bump(&self.stats.expired_purged);
                    tracing::debug!(key, ?reason, "Discarded stale persisted entry");
                    None
                }
            },
            Err(e) => {
                self.remove_persistent(&persistent_key);
                StatsRecorder::bump(&self.stats.corrupt_purged);
                tracing::warn!(key, error = %e, "Discarded corrupt persisted entry");
                None
            }
        }
    }

    /// [`get`](Self::get), or on a miss run `generate`, cache its value with
    /// the default TTL and return it.
    pub fn get_or_insert_with<T, F>(&self, key: &str, generate: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = generate();
        StatsRecorder::bump(&self.stats.generated);
        self.set(key, &value);
        value
    }

    /// Async form of [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// Only the generator suspends; tier access does not.
    pub async fn get_or_generate<T, F, Fut>(&self, key: &str, generate: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = generate().await;
        StatsRecorder::bump(&self.stats.generated);
        self.set(key, &value);
        value
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Write `data` to both tiers with the default TTL.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T) {
        self.set_with_ttl(key, data, self.config.default_ttl);
    }

    /// Write `data` to both tiers, stamped with now and the store version.
    pub fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, data: &T, ttl: Duration) {
        let data = match encode(key, data) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Value not cached");
                return;
            }
        };

        let entry = CacheEntry::new(
            data,
            self.clock.now_millis(),
            ttl,
            self.config.store_version.clone(),
        );

        match serde_json::to_vec(&entry) {
            Ok(bytes) => self.write_persistent(key, &bytes),
            Err(e) => {
                StatsRecorder::bump(&self.stats.dropped_writes);
                tracing::warn!(key, error = %e, "Entry could not be encoded for the persistent tier");
            }
        }

        lock(&self.memory).insert(key.to_string(), entry);
    }

    fn write_persistent(&self, key: &str, bytes: &[u8]) {
        let persistent_key = self.persistent_key(key);
        let error = match self.persistent.put(&persistent_key, bytes) {
            Ok(()) => return,
            Err(e) => e,
        };

        if !error.is_quota_exceeded() {
            StatsRecorder::bump(&self.stats.dropped_writes);
            tracing::warn!(key, error = %error, "Persistent write failed; memory tier only");
            return;
        }

        let purged = self.purge_expired();
        tracing::info!(key, purged, "Persistent tier full; purged expired entries, retrying");

        match self.persistent.put(&persistent_key, bytes) {
            Ok(()) => StatsRecorder::bump(&self.stats.quota_recoveries),
            Err(e) => {
                StatsRecorder::bump(&self.stats.dropped_writes);
                tracing::warn!(key, error = %e, "Persistent write dropped after quota purge");
            }
        }
    }

    fn remove_persistent(&self, persistent_key: &str) {
        if let Err(e) = self.persistent.delete(persistent_key) {
            tracing::warn!(key = persistent_key, error = %e, "Persistent delete failed");
        }
    }

    /// Remove `key` from both tiers.
    pub fn delete(&self, key: &str) {
        lock(&self.memory).remove(key);
        self.remove_persistent(&self.persistent_key(key));
    }

    /// Remove every entry this store owns. Persisted keys outside the
    /// configured prefix are left alone.
    pub fn clear(&self) {
        lock(&self.memory).clear();

        match self.persistent.keys_with_prefix(&self.config.key_prefix) {
            Ok(keys) => {
                for key in &keys {
                    self.remove_persistent(key);
                }
                tracing::debug!(removed = keys.len(), "Offline store cleared");
            }
            Err(e) => tracing::warn!(error = %e, "Could not list persisted keys to clear"),
        }
    }

    /// Drop expired, version-mismatched and unreadable entries from both
    /// tiers. Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();

        let memory_purged = {
            let mut memory = lock(&self.memory);
            let before = memory.len();
            memory.retain(|_, entry| self.validity(entry, now).is_valid());
            before - memory.len()
        };

        let mut expired = 0usize;
        let mut corrupt = 0usize;

        match self.persistent.keys_with_prefix(&self.config.key_prefix) {
            Ok(keys) => {
                for key in keys {
                    let bytes = match self.persistent.get(&key) {
                        Ok(Some(bytes)) => bytes,
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Persistent tier read failed during purge");
                            continue;
                        }
                    };
                    match serde_json::from_slice::<CacheEntry<Value>>(&bytes) {
                        Ok(entry) if self.validity(&entry, now).is_valid() => {}
                        Ok(_) => {
                            self.remove_persistent(&key);
                            expired += 1;
                        }
                        Err(_) => {
                            self.remove_persistent(&key);
                            corrupt += 1;
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not list persisted keys to purge"),
        }

        StatsRecorder::add(&self.stats.expired_purged, (memory_purged + expired) as u64);
        StatsRecorder::add(&self.stats.corrupt_purged, corrupt as u64);

        let total = memory_purged + expired + corrupt;
        if total > 0 {
            tracing::debug!(memory_purged, expired, corrupt, "Purged invalid cache entries");
        }
        total
    }

    // ========================================================================
    // CONNECTIVITY
    // ========================================================================

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Set the offline flag. Going from offline to online runs the resync hooks.
    pub fn set_offline_mode(&self, offline: bool) {
        let was_offline = self.offline.swap(offline, Ordering::SeqCst);
        if was_offline == offline {
            return;
        }

        if offline {
            tracing::info!("Offline store entering offline mode");
        } else {
            tracing::info!("Offline store back online; running resync hooks");
            self.run_resync_hooks();
        }
    }

    /// Register a callback for the offline-to-online transition.
    pub fn on_resync(&self, hook: impl Fn() + Send + Sync + 'static) {
        lock(&self.resync_hooks).push(Arc::new(hook));
    }

    fn run_resync_hooks(&self) {
        let hooks: Vec<ResyncHook> = lock(&self.resync_hooks).clone();
        for hook in hooks {
            hook();
        }
    }

    /// Follow `observer`: adopt its current value, then track its events
    /// until [`stop`](Self::stop). Must be called inside a tokio runtime.
    pub fn start(self: &Arc<Self>, observer: &dyn NetworkObserver) {
        let mut events = observer.subscribe();
        self.set_offline_mode(!observer.is_online());

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store: Weak<Self> = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    event = events.recv() => event,
                };

                let online = match event {
                    Ok(NetworkEvent::Online) => true,
                    Ok(NetworkEvent::Offline) => false,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Network listener lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                match store.upgrade() {
                    Some(store) => store.set_offline_mode(!online),
                    None => break,
                }
            }
        });

        let previous = lock(&self.listener).replace(Listener { shutdown_tx, task });
        if let Some(previous) = previous {
            let _ = previous.shutdown_tx.send(true);
            previous.task.abort();
        }
    }

    /// Stop following the network observer.
    pub fn stop(&self) {
        if let Some(listener) = lock(&self.listener).take() {
            let _ = listener.shutdown_tx.send(true);
            listener.task.abort();
            tracing::debug!("Offline store network listener stopped");
        }
    }
}

impl Drop for OfflineStore {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for OfflineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineStore")
            .field("config", &self.config)
            .field("memory_entries", &lock(&self.memory).len())
            .field("offline", &self.is_offline())
            .field("stats", &self.stats())
            .finish()
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, data: &T) -> Result<Value, StorageError> {
    serde_json::to_value(data).map_err(|e| StorageError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(key: &str, data: Value) -> Result<T, StorageError> {
    serde_json::from_value(data).map_err(|e| StorageError::Deserialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ManualNetworkObserver;
    use lifeline_core::ManualClock;
    use serde::Deserialize;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        visits: u32,
    }

    fn profile() -> Profile {
        Profile {
            name: "ada".to_string(),
            visits: 3,
        }
    }

    struct Fixture {
        store: OfflineStore,
        persistent: Arc<InMemoryKeyValueStore>,
        clock: Arc<ManualClock>,
    }

    fn fixture_with(persistent: Arc<InMemoryKeyValueStore>, version: &str) -> Fixture {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = OfflineStore::open_with_clock(
            OfflineStoreConfig::default().with_store_version(version),
            persistent.clone(),
            clock.clone(),
        )
        .expect("store should open");
        Fixture {
            store,
            persistent,
            clock,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(InMemoryKeyValueStore::new()), "1.0.0")
    }

    #[test]
    fn test_round_trip_skips_generator() {
        let f = fixture();
        f.store
            .set_with_ttl("k", &profile(), Duration::from_millis(1_000));

        assert_eq!(f.store.get::<Profile>("k"), Some(profile()));

        let calls = AtomicUsize::new(0);
        let value = f.store.get_or_insert_with("k", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Profile {
                name: "generated".to_string(),
                visits: 0,
            }
        });
        assert_eq!(value, profile());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.store.stats().memory_hits, 2);
    }

    #[test]
    fn test_expiry_invokes_generator_once_and_recaches() {
        let f = fixture();
        f.store.set_with_ttl("k", &1u32, Duration::from_millis(1_000));

        f.clock.advance(Duration::from_millis(1_000));
        assert_eq!(f.store.get::<u32>("k"), Some(1), "boundary is still valid");

        f.clock.advance(Duration::from_millis(1));
        assert_eq!(f.store.get::<u32>("k"), None);

        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let value = f.store.get_or_insert_with("k", || {
                calls.fetch_add(1, Ordering::SeqCst);
                42u32
            });
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.stats().generated, 1);
    }

    #[test]
    fn test_persistent_hit_repopulates_memory() {
        let persistent = Arc::new(InMemoryKeyValueStore::new());
        {
            let f = fixture_with(persistent.clone(), "1.0.0");
            f.store.set("user", &profile());
        }

        let f = fixture_with(persistent, "1.0.0");
        assert_eq!(f.store.get::<Profile>("user"), Some(profile()));
        assert_eq!(f.store.get::<Profile>("user"), Some(profile()));

        let stats = f.store.stats();
        assert_eq!(stats.persistent_hits, 1);
        assert_eq!(stats.memory_hits, 1);
    }

    #[test]
    fn test_version_change_invalidates_and_purges() {
        let persistent = Arc::new(InMemoryKeyValueStore::new());
        {
            let f = fixture_with(persistent.clone(), "1.0.0");
            f.store.set("k", &"old");
        }
        assert_eq!(persistent.len(), 1);

        let f = fixture_with(persistent.clone(), "1.0.1");
        assert_eq!(f.store.get::<String>("k"), None);
        assert!(f.persistent.is_empty(), "startup sweep purges the old entry");
    }

    #[test]
    fn test_startup_sweep_purges_corrupt_entries() {
        let persistent = Arc::new(InMemoryKeyValueStore::new());
        persistent.put("lifeline:bad", b"not json").unwrap();
        persistent.put("unrelated", b"not json either").unwrap();

        let f = fixture_with(persistent, "1.0.0");
        assert_eq!(f.persistent.get("lifeline:bad").unwrap(), None);
        assert!(f.persistent.get("unrelated").unwrap().is_some());
        assert_eq!(f.store.stats().corrupt_purged, 1);
    }

    #[test]
    fn test_corrupt_entry_on_read_is_a_miss() {
        let f = fixture();
        f.persistent.put("lifeline:k", b"{\"data\":").unwrap();

        assert_eq!(f.store.get::<u32>("k"), None);
        assert_eq!(f.persistent.get("lifeline:k").unwrap(), None);
        assert_eq!(f.store.stats().corrupt_purged, 1);
    }

    #[test]
    fn test_delete_removes_both_tiers() {
        let f = fixture();
        f.store.set("k", &5u8);
        f.store.delete("k");

        assert_eq!(f.store.get::<u8>("k"), None);
        assert!(f.persistent.is_empty());
    }

    #[test]
    fn test_clear_respects_prefix() {
        let f = fixture();
        f.persistent.put("theme", b"dark").unwrap();
        f.store.set("a", &1u8);
        f.store.set("b", &2u8);

        f.store.clear();

        assert_eq!(f.store.get::<u8>("a"), None);
        assert_eq!(f.store.get::<u8>("b"), None);
        assert_eq!(f.persistent.get("theme").unwrap(), Some(b"dark".to_vec()));
    }

    #[test]
    fn test_quota_failure_purges_and_retries() {
        let persistent = Arc::new(InMemoryKeyValueStore::with_quota(180));
        let f = fixture_with(persistent, "1.0.0");

        f.store.set_with_ttl("old", &"x".repeat(40), Duration::from_millis(10));
        f.clock.advance(Duration::from_millis(20));

        // Does not fit next to the expired entry, fits once it is purged.
        f.store.set("new", &"y".repeat(40));

        let stats = f.store.stats();
        assert_eq!(stats.quota_recoveries, 1);
        assert_eq!(stats.dropped_writes, 0);
        assert!(f.persistent.get("lifeline:new").unwrap().is_some());
        assert!(f.persistent.get("lifeline:old").unwrap().is_none());
        assert_eq!(f.store.get::<String>("new"), Some("y".repeat(40)));
    }

    #[test]
    fn test_quota_failure_twice_drops_silently() {
        let persistent = Arc::new(InMemoryKeyValueStore::with_quota(32));
        let f = fixture_with(persistent, "1.0.0");

        f.store.set("big", &"z".repeat(100));

        assert_eq!(f.store.stats().dropped_writes, 1);
        assert!(f.persistent.is_empty());
        // Memory stays authoritative.
        assert_eq!(f.store.get::<String>("big"), Some("z".repeat(100)));
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let f = fixture();
        f.store.set("k", &"text");
        assert_eq!(f.store.get::<u32>("k"), None);
        assert_eq!(f.store.get::<String>("k"), Some("text".to_string()));
    }

    #[test]
    fn test_unserializable_value_is_not_cached() {
        let f = fixture();
        let mut grid = HashMap::new();
        grid.insert((1u8, 2u8), 3u8);

        assert!(matches!(
            encode("grid", &grid),
            Err(StorageError::Serialization { ref key, .. }) if key == "grid"
        ));

        f.store.set("grid", &grid);
        assert!(f.persistent.is_empty());
        assert_eq!(f.store.get::<serde_json::Value>("grid"), None);
    }

    #[test]
    fn test_decode_reports_key_on_type_mismatch() {
        let err = decode::<u32>("k", Value::from("text")).unwrap_err();
        assert!(matches!(err, StorageError::Deserialization { ref key, .. } if key == "k"));
    }

    #[test]
    fn test_resync_hooks_run_on_reconnect() {
        let f = fixture();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        f.store.on_resync(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        f.store.set_offline_mode(false);
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        f.store.set_offline_mode(true);
        assert!(f.store.is_offline());
        f.store.set_offline_mode(true);
        f.store.set_offline_mode(false);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_follows_network_observer() {
        let store = Arc::new(OfflineStore::in_memory(OfflineStoreConfig::default()).unwrap());
        let observer = ManualNetworkObserver::new(false);

        store.start(&observer);
        assert!(store.is_offline());

        observer.set_online(true);
        for _ in 0..100 {
            if !store.is_offline() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!store.is_offline());

        store.stop();
        observer.set_online(false);
        tokio::task::yield_now().await;
        assert!(!store.is_offline());
    }

    #[tokio::test]
    async fn test_get_or_generate_awaits_generator_once() {
        let f = fixture();
        let first: Vec<u8> = f.store.get_or_generate("k", || async { vec![1, 2, 3] }).await;
        let second: Vec<u8> = f.store.get_or_generate("k", || async { vec![9] }).await;
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(second, vec![1, 2, 3]);
    }
}
