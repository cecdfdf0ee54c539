//! LIFELINE Test Utilities
//!
//! Shared test infrastructure for the LIFELINE workspace:
//! - A scripted connector whose probes succeed, fail or hang on demand
//! - Persistent-tier wrappers that simulate quota exhaustion and corruption
//! - Proptest generators and fixtures

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use lifeline_connection::StoreConnector;
use proptest::prelude::*;

pub use lifeline_core::{
    CacheEntry, ConnectionConfig, ConnectionError, ConnectionState, LifelineError,
    LifelineResult, ManualClock, OfflineStoreConfig, StorageError,
};
pub use lifeline_storage::{InMemoryKeyValueStore, KeyValueStore, OfflineStore};

// ============================================================================
// SCRIPTED CONNECTOR
// ============================================================================

/// What the next probe does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Succeed,
    Fail(String),
    /// Never completes; only a timeout ends it
    Hang,
}

/// Client handed out by [`ScriptedConnector`]. `id` counts creations from 1.
#[derive(Debug)]
pub struct ScriptedClient {
    pub id: u32,
}

/// Connector whose probe results follow a script, then a default.
///
/// Clones share the script and the counters, so a test can keep one clone
/// and hand the other to the manager. Every probe first waits
/// `probe_delay` and every creation `create_delay`, which lets paused-time
/// tests observe latency and overlapping callers.
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    state: Arc<ScriptState>,
    probe_delay: Duration,
    create_delay: Duration,
}

#[derive(Debug)]
struct ScriptState {
    script: Mutex<VecDeque<ProbeOutcome>>,
    default: Mutex<ProbeOutcome>,
    create_failures: AtomicU32,
    creates: AtomicU32,
    probes: AtomicU32,
    closes: AtomicU32,
}

impl Default for ScriptedConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedConnector {
    /// A connector whose probes always succeed.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ScriptState {
                script: Mutex::new(VecDeque::new()),
                default: Mutex::new(ProbeOutcome::Succeed),
                create_failures: AtomicU32::new(0),
                creates: AtomicU32::new(0),
                probes: AtomicU32::new(0),
                closes: AtomicU32::new(0),
            }),
            probe_delay: Duration::ZERO,
            create_delay: Duration::ZERO,
        }
    }

    /// A connector whose probes always fail.
    pub fn always_failing() -> Self {
        Self::new().with_default(ProbeOutcome::Fail("store unreachable".to_string()))
    }

    pub fn then_succeed(self) -> Self {
        self.push(ProbeOutcome::Succeed)
    }

    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.push(ProbeOutcome::Fail(reason.into()))
    }

    pub fn then_hang(self) -> Self {
        self.push(ProbeOutcome::Hang)
    }

    pub fn with_default(self, outcome: ProbeOutcome) -> Self {
        self.set_default(outcome);
        self
    }

    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// The next `n` `create_client` calls fail.
    pub fn with_create_failures(self, n: u32) -> Self {
        self.state.create_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Change what unscripted probes do from now on.
    pub fn set_default(&self, outcome: ProbeOutcome) {
        *self
            .state
            .default
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    fn push(self, outcome: ProbeOutcome) -> Self {
        self.queue(outcome);
        self
    }

    /// Append to the script of an already-shared connector.
    pub fn queue(&self, outcome: ProbeOutcome) {
        self.state
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    fn next_outcome(&self) -> ProbeOutcome {
        let scripted = self
            .state
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        scripted.unwrap_or_else(|| {
            self.state
                .default
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    pub fn create_count(&self) -> u32 {
        self.state.creates.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> u32 {
        self.state.probes.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> u32 {
        self.state.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for ScriptedConnector {
    type Client = ScriptedClient;

    async fn create_client(&self) -> LifelineResult<ScriptedClient> {
        let id = self.state.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        let failing = self
            .state
            .create_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ConnectionError::ClientCreation {
                reason: format!("scripted create failure #{}", id),
            }
            .into());
        }
        Ok(ScriptedClient { id })
    }

    async fn probe(&self, _client: &ScriptedClient) -> LifelineResult<()> {
        self.state.probes.fetch_add(1, Ordering::SeqCst);
        let outcome = self.next_outcome();

        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }

        match outcome {
            ProbeOutcome::Succeed => Ok(()),
            ProbeOutcome::Fail(reason) => Err(ConnectionError::ProbeFailed { reason }.into()),
            ProbeOutcome::Hang => std::future::pending().await,
        }
    }

    async fn close(&self, _client: &ScriptedClient) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// PERSISTENT-TIER FAKES
// ============================================================================

/// Wraps a store and fails the next N writes with `QuotaExceeded`.
#[derive(Debug, Default)]
pub struct QuotaLimitedStore {
    inner: InMemoryKeyValueStore,
    failures_left: AtomicUsize,
    rejected: AtomicUsize,
}

impl QuotaLimitedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_puts(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Writes refused so far.
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryKeyValueStore {
        &self.inner
    }
}

impl KeyValueStore for QuotaLimitedStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let refuse = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refuse {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.keys_with_prefix(prefix)
    }
}

/// Wraps a store; while corruption is on, reads return truncated bytes and
/// writes fail with a backend error.
#[derive(Debug, Default)]
pub struct CorruptingStore {
    inner: InMemoryKeyValueStore,
    corrupt: AtomicBool,
}

impl CorruptingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_corrupt(&self, corrupt: bool) {
        self.corrupt.store(corrupt, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryKeyValueStore {
        &self.inner
    }
}

impl KeyValueStore for CorruptingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self.inner.get(key)?;
        if !self.corrupt.load(Ordering::SeqCst) {
            return Ok(value);
        }
        Ok(value.map(|bytes| bytes[..bytes.len() / 2].to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(StorageError::Backend {
                reason: format!("simulated I/O error writing {}", key),
            });
        }
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.keys_with_prefix(prefix)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Short delays so paused-time tests stay readable: base 100ms, 3 attempts.
pub fn fast_connection_config() -> ConnectionConfig {
    ConnectionConfig::default()
        .with_max_attempts(3)
        .with_base_retry_delay(Duration::from_millis(100))
        .with_probe_timeout(Duration::from_secs(1))
        .with_health_check_interval(Duration::from_secs(30))
}

/// In-memory offline store with a manual clock starting at `start_millis`.
pub fn test_store_with_clock(
    config: OfflineStoreConfig,
    start_millis: i64,
) -> (Arc<OfflineStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_millis));
    let store = OfflineStore::open_with_clock(
        config,
        Arc::new(InMemoryKeyValueStore::new()),
        clock.clone(),
    )
    .expect("default test config is valid");
    (Arc::new(store), clock)
}

/// In-memory offline store with default settings.
pub fn test_store() -> Arc<OfflineStore> {
    Arc::new(
        OfflineStore::in_memory(OfflineStoreConfig::default())
            .expect("default test config is valid"),
    )
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Semver-looking store versions.
pub fn arb_store_version() -> impl Strategy<Value = String> {
    (0u8..5, 0u8..10, 0u8..10).prop_map(|(major, minor, patch)| {
        format!("{}.{}.{}", major, minor, patch)
    })
}

/// Cache keys: short, printable, never empty.
pub fn arb_cache_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_:]{0,24}"
}

/// JSON payloads of the shapes applications actually cache.
pub fn arb_json_value() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-zA-Z0-9 ]{0,32}".prop_map(serde_json::Value::from),
        any::<bool>().prop_map(serde_json::Value::from),
        prop::collection::vec(any::<i32>(), 0..8).prop_map(serde_json::Value::from),
    ]
}

pub fn arb_cache_entry() -> impl Strategy<Value = CacheEntry<serde_json::Value>> {
    (
        arb_json_value(),
        0i64..4_000_000_000_000,
        0u64..86_400_000,
        arb_store_version(),
    )
        .prop_map(|(data, timestamp, ttl_ms, version)| {
            CacheEntry::new(data, timestamp, Duration::from_millis(ttl_ms), version)
        })
}

/// Valid connection configs with small delays.
pub fn arb_connection_config() -> impl Strategy<Value = ConnectionConfig> {
    (
        1u32..6,
        1u64..1_000,
        1u64..60_000,
        1u64..10_000,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(attempts, base_ms, interval_ms, timeout_ms, auto_retry, fallback)| {
                ConnectionConfig::default()
                    .with_max_attempts(attempts)
                    .with_base_retry_delay(Duration::from_millis(base_ms))
                    .with_health_check_interval(Duration::from_millis(interval_ms))
                    .with_probe_timeout(Duration::from_millis(timeout_ms))
                    .with_auto_retry(auto_retry)
                    .with_offline_fallback(fallback)
            },
        )
}
