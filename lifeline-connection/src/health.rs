//! Periodic health checks for a connected client.
//!
//! The worker ticks every `health_check_interval`. A tick only probes while
//! the manager is `Connected` and no connection attempt is in flight. A
//! failed probe closes the client, moves the manager to `Error` and, with
//! auto-retry enabled, starts a reconnect in the background.

use std::sync::{Arc, Weak};
use std::time::Duration;

use lifeline_core::ConnectionState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::connector::StoreConnector;
use crate::manager::{lock, Inner};

/// Shutdown switch for a background task.
pub(crate) struct WorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub(crate) fn new(shutdown_tx: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self { shutdown_tx, task }
    }

    pub(crate) fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }
}

pub(crate) fn spawn_health_worker<C: StoreConnector>(
    inner: Weak<Inner<C>>,
    period: Duration,
) -> WorkerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        // First check one full period after connecting.
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(interval_ms = period.as_millis() as u64, "Health check worker started");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let Some(inner) = inner.upgrade() else { break };
                    inner.run_health_check().await;
                }
            }
        }

        tracing::debug!("Health check worker stopped");
    });

    WorkerHandle::new(shutdown_tx, task)
}

impl<C: StoreConnector> Inner<C> {
    async fn run_health_check(self: &Arc<Self>) {
        if !self.state().is_usable() || self.attempt_in_flight() {
            tracing::trace!("Skipping health check");
            return;
        }

        let Some(client) = lock(&self.client).clone() else {
            return;
        };

        match self.test_connection(&client).await {
            Ok(latency_ms) => {
                tracing::trace!(latency_ms, "Health check passed");
            }
            Err(e) => {
                // A disconnect or reconnect may have replaced the client during the probe.
                let released = {
                    let mut slot = lock(&self.client);
                    let current = slot
                        .as_ref()
                        .is_some_and(|live| Arc::ptr_eq(live, &client));
                    if !current || !self.state().is_usable() {
                        return;
                    }
                    self.set_state(ConnectionState::Error);
                    slot.take()
                };

                self.record_error(&e);
                tracing::warn!(error = %e, "Health check failed");
                if let Some(client) = released {
                    self.close_in_background(client);
                }

                if self.config.enable_auto_retry {
                    let inner = Arc::clone(self);
                    tokio::spawn(async move {
                        match inner.connect().await {
                            Ok(Some(_)) => tracing::info!("Reconnected after failed health check"),
                            Ok(None) => tracing::warn!("Reconnect exhausted; now offline"),
                            Err(e) => tracing::error!(error = %e, "Reconnect failed"),
                        }
                    });
                }
            }
        }
    }
}
