//! Connection resilience manager.
//!
//! Owns one backing-store client and the connection state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected
//!                     |  ^          |
//!        (retry/backoff) |     health check fails
//!                     v  |          v
//!                   Error <------ Error -> Connecting   (auto-retry)
//!                     |
//!                     v  (attempts exhausted, fallback on)
//!                  Offline -> Connecting                (go_online / host online)
//! ```
//!
//! Concurrent callers share a single in-flight attempt. Every query either
//! reaches a healthy client or runs the caller's fallback.
//!
//! `disconnect`, `force_offline` and `stop` advance a lifecycle epoch. An
//! attempt started under an older epoch closes whatever client it obtained
//! and leaves the state alone.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use lifeline_core::{
    ConnectionConfig, ConnectionError, ConnectionMetrics, ConnectionState, HealthCheck,
    HealthStatus, LifelineError, LifelineResult, TimeoutError,
};
use lifeline_storage::{NetworkEvent, NetworkObserver, OfflineStore};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};

use crate::connector::StoreConnector;
use crate::health::{spawn_health_worker, WorkerHandle};

type AttemptResult<T> = LifelineResult<Option<Arc<T>>>;
type Attempt<T> = Shared<BoxFuture<'static, AttemptResult<T>>>;

/// The shared attempt and the epoch it was started under.
struct InFlight<T> {
    epoch: u64,
    attempt: Attempt<T>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resilient access to one backing store.
///
/// Cheap to clone; clones share the same client, state and metrics.
pub struct ConnectionManager<C: StoreConnector> {
    inner: Arc<Inner<C>>,
}

impl<C: StoreConnector> Clone for ConnectionManager<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct Inner<C: StoreConnector> {
    pub(crate) config: ConnectionConfig,
    connector: Arc<C>,
    store: Arc<OfflineStore>,
    state: Mutex<ConnectionState>,
    metrics: Mutex<ConnectionMetrics>,
    pub(crate) client: Mutex<Option<Arc<C::Client>>>,
    epoch: AtomicU64,
    in_flight: Mutex<Option<InFlight<C::Client>>>,
    health: Mutex<Option<WorkerHandle>>,
    network: Mutex<Option<WorkerHandle>>,
}

impl<C: StoreConnector> ConnectionManager<C> {
    /// Build a manager. Nothing is attempted until the first `get_client()`
    /// or `connect()`.
    pub fn new(
        config: ConnectionConfig,
        connector: C,
        store: Arc<OfflineStore>,
    ) -> LifelineResult<Self> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                connector: Arc::new(connector),
                store,
                state: Mutex::new(ConnectionState::Disconnected),
                metrics: Mutex::new(ConnectionMetrics::default()),
                client: Mutex::new(None),
                epoch: AtomicU64::new(0),
                in_flight: Mutex::new(None),
                health: Mutex::new(None),
                network: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Snapshot of the connection metrics.
    pub fn metrics(&self) -> ConnectionMetrics {
        lock(&self.inner.metrics).clone()
    }

    /// Offline mode is forced when the manager is `Offline` or the offline
    /// store reports the host offline.
    pub fn is_offline(&self) -> bool {
        self.inner.is_offline()
    }

    pub fn offline_store(&self) -> &Arc<OfflineStore> {
        &self.inner.store
    }

    pub fn health(&self) -> HealthCheck {
        let state = self.state();
        let metrics = self.metrics();

        let mut check = HealthCheck::new(HealthStatus::from(state), "connection")
            .with_message(format!("connection {}", state))
            .with_metadata("total_attempts", serde_json::json!(metrics.total_attempts))
            .with_metadata(
                "failed_connections",
                serde_json::json!(metrics.failed_connections),
            )
            .with_metadata("success_rate", serde_json::json!(metrics.success_rate()));
        if metrics.successful_connections > 0 {
            check = check.with_response_time(metrics.average_response_time);
        }
        if let Some(error) = metrics.last_error {
            check = check.with_metadata("last_error", serde_json::json!(error));
        }
        check
    }

    /// The live client, connecting first if needed.
    ///
    /// Returns `Ok(None)` without attempting anything while offline mode is
    /// forced.
    pub async fn get_client(&self) -> AttemptResult<C::Client> {
        self.inner.get_client().await
    }

    /// Connect, joining the attempt already in flight if there is one.
    ///
    /// `Ok(None)` means the attempts were exhausted and the manager degraded
    /// to `Offline`. With offline fallback disabled exhaustion is an error.
    pub async fn connect(&self) -> AttemptResult<C::Client> {
        self.inner.connect().await
    }

    /// Run `query` against the live client, or `fallback` when there is none.
    ///
    /// With offline fallback enabled a failing query, or a failure to obtain
    /// a client, also runs `fallback`. When the fallback fails too its error
    /// is returned.
    pub async fn execute_with_fallback<T, Q, QFut, F, FFut>(
        &self,
        query: Q,
        fallback: F,
    ) -> LifelineResult<T>
    where
        Q: FnOnce(Arc<C::Client>) -> QFut,
        QFut: Future<Output = LifelineResult<T>>,
        F: FnOnce() -> FFut,
        FFut: Future<Output = LifelineResult<T>>,
    {
        let fallback_enabled = self.inner.config.enable_offline_fallback;

        let client = match self.get_client().await {
            Ok(client) => client,
            Err(e) if fallback_enabled => {
                tracing::warn!(error = %e, "Could not obtain a client; using fallback");
                return run_fallback(fallback, Some(e)).await;
            }
            Err(e) => return Err(e),
        };

        let Some(client) = client else {
            tracing::debug!("No live client; using fallback");
            return run_fallback(fallback, None).await;
        };

        match query(client).await {
            Ok(value) => Ok(value),
            Err(e) if fallback_enabled => {
                tracing::warn!(error = %e, "Query failed; using fallback");
                self.inner.record_error(&e);
                run_fallback(fallback, Some(e)).await
            }
            Err(e) => Err(e),
        }
    }

    /// [`execute_with_fallback`](Self::execute_with_fallback) with a
    /// synchronous fallback, typically a cache read.
    pub async fn execute_with_sync_fallback<T, Q, QFut, F>(
        &self,
        query: Q,
        fallback: F,
    ) -> LifelineResult<T>
    where
        Q: FnOnce(Arc<C::Client>) -> QFut,
        QFut: Future<Output = LifelineResult<T>>,
        F: FnOnce() -> LifelineResult<T>,
    {
        self.execute_with_fallback(query, || std::future::ready(fallback()))
            .await
    }

    /// Release the client and stop health checks. An attempt still in
    /// flight is superseded and closes its client when it completes.
    pub async fn disconnect(&self) {
        self.inner.disconnect().await;
    }

    /// Disconnect and stay offline until `go_online()` or a host online event.
    pub async fn force_offline(&self) {
        self.inner.enter_offline().await;
    }

    /// Leave offline mode and connect.
    pub async fn go_online(&self) -> AttemptResult<C::Client> {
        self.inner.go_online().await
    }

    /// Follow host connectivity: an online event while offline reconnects in
    /// the background. Must be called inside a tokio runtime.
    pub fn start(&self, observer: &dyn NetworkObserver) {
        let mut events = observer.subscribe();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let weak = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    event = events.recv() => event,
                };

                match event {
                    Ok(NetworkEvent::Online) => {
                        let Some(inner) = weak.upgrade() else { break };
                        if inner.state() == ConnectionState::Offline {
                            tracing::info!("Host back online; reconnecting");
                            tokio::spawn(async move {
                                if let Err(e) = inner.go_online().await {
                                    tracing::warn!(error = %e, "Reconnect after host online failed");
                                }
                            });
                        }
                    }
                    Ok(NetworkEvent::Offline) => {
                        tracing::info!("Host went offline");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Network listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        if let Some(previous) = lock(&self.inner.network).replace(WorkerHandle::new(shutdown_tx, task)) {
            previous.stop();
        }
    }

    /// Stop background work and disconnect.
    pub async fn stop(&self) {
        if let Some(network) = lock(&self.inner.network).take() {
            network.stop();
        }
        self.inner.disconnect().await;
        tracing::info!("Connection manager stopped");
    }
}

async fn run_fallback<T, F, FFut>(fallback: F, cause: Option<LifelineError>) -> LifelineResult<T>
where
    F: FnOnce() -> FFut,
    FFut: Future<Output = LifelineResult<T>>,
{
    match fallback().await {
        Ok(value) => Ok(value),
        Err(fallback_error) => {
            match cause {
                Some(cause) => tracing::error!(
                    error = %cause,
                    fallback_error = %fallback_error,
                    "Query and fallback both failed"
                ),
                None => tracing::error!(error = %fallback_error, "Fallback failed"),
            }
            Err(fallback_error)
        }
    }
}

impl<C: StoreConnector> Inner<C> {
    pub(crate) fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    pub(crate) fn set_state(&self, to: ConnectionState) {
        let from = std::mem::replace(&mut *lock(&self.state), to);
        if from != to {
            tracing::info!(from = %from, to = %to, "Connection state changed");
        }
    }

    fn is_offline(&self) -> bool {
        self.state() == ConnectionState::Offline || self.store.is_offline()
    }

    pub(crate) fn attempt_in_flight(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    pub(crate) fn record_error(&self, error: &LifelineError) {
        lock(&self.metrics).record_error(error.to_string(), Utc::now());
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Invalidate the in-flight attempt, if any. Callers hold the client lock.
    fn advance_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        lock(&self.in_flight).take();
    }

    fn live_client(&self) -> Option<Arc<C::Client>> {
        if !self.state().is_usable() {
            return None;
        }
        lock(&self.client).clone()
    }

    async fn get_client(self: &Arc<Self>) -> AttemptResult<C::Client> {
        if self.is_offline() {
            return Ok(None);
        }
        if let Some(client) = self.live_client() {
            return Ok(Some(client));
        }
        self.connect().await
    }

    pub(crate) async fn connect(self: &Arc<Self>) -> AttemptResult<C::Client> {
        if let Some(client) = self.live_client() {
            return Ok(Some(client));
        }

        let attempt = {
            let mut slot = lock(&self.in_flight);
            match slot.as_ref() {
                Some(in_flight) => in_flight.attempt.clone(),
                None => {
                    let epoch = self.epoch();
                    let inner = Arc::clone(self);
                    let attempt = async move {
                        let result = inner.attempt_connection(epoch).await;
                        let mut slot = lock(&inner.in_flight);
                        if slot.as_ref().is_some_and(|in_flight| in_flight.epoch == epoch) {
                            slot.take();
                        }
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(InFlight {
                        epoch,
                        attempt: attempt.clone(),
                    });
                    attempt
                }
            }
        };

        attempt.await
    }

    /// What a superseded attempt reports: nothing while offline, otherwise
    /// no connection.
    fn superseded(&self) -> AttemptResult<C::Client> {
        tracing::debug!("Connection attempt superseded by a lifecycle change");
        if self.is_offline() {
            Ok(None)
        } else {
            Err(ConnectionError::NotConnected.into())
        }
    }

    async fn attempt_connection(self: &Arc<Self>, epoch: u64) -> AttemptResult<C::Client> {
        self.set_state(ConnectionState::Connecting);

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts_made = 0;
        let mut last_error = LifelineError::from(ConnectionError::NotConnected);

        for attempt in 1..=max_attempts {
            if self.epoch() != epoch {
                return self.superseded();
            }

            attempts_made = attempt;
            lock(&self.metrics).record_attempt();

            match self.try_connect().await {
                Ok((client, latency_ms)) => {
                    let committed = {
                        let mut slot = lock(&self.client);
                        if self.epoch() == epoch {
                            *slot = Some(Arc::clone(&client));
                            self.set_state(ConnectionState::Connected);
                            self.start_health_checks();
                            true
                        } else {
                            false
                        }
                    };

                    if !committed {
                        self.connector.close(&client).await;
                        return self.superseded();
                    }

                    lock(&self.metrics).record_success(latency_ms, Utc::now());
                    tracing::info!(attempt, latency_ms, "Connected to backing store");
                    return Ok(Some(client));
                }
                Err(e) => {
                    lock(&self.metrics).record_failure(e.to_string(), Utc::now());

                    if !e.is_connection_level() {
                        tracing::error!(error = %e, "Connector failed with a non-retryable error");
                        last_error = e;
                        break;
                    }

                    if attempt < max_attempts {
                        let delay = self.config.backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Connection attempt failed; retrying"
                        );
                        sleep(delay).await;
                    }
                    last_error = e;
                }
            }
        }

        let outcome = {
            let mut slot = lock(&self.client);
            if self.epoch() == epoch {
                self.set_state(ConnectionState::Error);
                let released = if self.config.enable_offline_fallback {
                    self.degrade_offline(&mut slot)
                } else {
                    None
                };
                Some(released)
            } else {
                None
            }
        };
        let Some(released) = outcome else {
            return self.superseded();
        };

        tracing::error!(
            attempts = attempts_made,
            error = %last_error,
            "Connection attempts exhausted"
        );
        if let Some(client) = released {
            self.connector.close(&client).await;
        }

        if self.config.enable_offline_fallback {
            Ok(None)
        } else {
            Err(ConnectionError::Exhausted {
                attempts: attempts_made,
                last_error: last_error.to_string(),
            }
            .into())
        }
    }

    /// One attempt: a fresh client that passed its probe, with probe latency.
    ///
    /// Client creation and the probe each get `probe_timeout`. A client whose
    /// probe fails is closed before the error is returned.
    async fn try_connect(&self) -> LifelineResult<(Arc<C::Client>, f64)> {
        let deadline = self.config.probe_timeout;
        let client = match timeout(deadline, self.connector.create_client()).await {
            Ok(created) => Arc::new(created?),
            Err(_) => {
                return Err(TimeoutError::ClientCreation {
                    after_ms: deadline.as_millis() as u64,
                }
                .into())
            }
        };

        match self.test_connection(&client).await {
            Ok(latency_ms) => Ok((client, latency_ms)),
            Err(e) => {
                self.connector.close(&client).await;
                Err(e)
            }
        }
    }

    /// Probe `client` on its own task, racing `probe_timeout`. A probe that
    /// loses the race is left to finish on its own.
    pub(crate) async fn test_connection(&self, client: &Arc<C::Client>) -> LifelineResult<f64> {
        let connector = Arc::clone(&self.connector);
        let probe_client = Arc::clone(client);
        let started = Instant::now();

        let probe = tokio::spawn(async move { connector.probe(&probe_client).await });

        match timeout(self.config.probe_timeout, probe).await {
            Ok(Ok(Ok(()))) => Ok(started.elapsed().as_secs_f64() * 1000.0),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(join_error)) => Err(ConnectionError::ProbeFailed {
                reason: join_error.to_string(),
            }
            .into()),
            Err(_) => Err(TimeoutError::Probe {
                after_ms: self.config.probe_timeout.as_millis() as u64,
            }
            .into()),
        }
    }

    /// Close `client` on its own task so the caller does not wait for it.
    pub(crate) fn close_in_background(&self, client: Arc<C::Client>) {
        let connector = Arc::clone(&self.connector);
        tokio::spawn(async move { connector.close(&client).await });
    }

    fn start_health_checks(self: &Arc<Self>) {
        let worker = spawn_health_worker(Arc::downgrade(self), self.config.health_check_interval);
        if let Some(previous) = lock(&self.health).replace(worker) {
            previous.stop();
        }
    }

    fn stop_health_checks(&self) {
        if let Some(worker) = lock(&self.health).take() {
            worker.stop();
        }
    }

    async fn disconnect(&self) {
        let client = {
            let mut slot = lock(&self.client);
            self.advance_epoch();
            self.stop_health_checks();
            self.set_state(ConnectionState::Disconnected);
            slot.take()
        };
        if let Some(client) = client {
            self.connector.close(&client).await;
        }
    }

    /// Degrade to cache-only operation, handing back the client to close.
    fn degrade_offline(&self, slot: &mut Option<Arc<C::Client>>) -> Option<Arc<C::Client>> {
        self.advance_epoch();
        self.stop_health_checks();
        self.set_state(ConnectionState::Offline);
        self.store.set_offline_mode(true);
        slot.take()
    }

    async fn enter_offline(&self) {
        let client = {
            let mut slot = lock(&self.client);
            self.degrade_offline(&mut slot)
        };
        if let Some(client) = client {
            self.connector.close(&client).await;
        }
    }

    async fn go_online(self: &Arc<Self>) -> AttemptResult<C::Client> {
        self.store.set_offline_mode(false);
        if self.state() == ConnectionState::Offline {
            self.set_state(ConnectionState::Disconnected);
        }
        self.connect().await
    }
}

impl<C: StoreConnector> std::fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("config", &self.inner.config)
            .field("metrics", &self.metrics())
            .finish()
    }
}
