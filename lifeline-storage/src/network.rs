//! Host network awareness.
//!
//! A [`NetworkObserver`] publishes online/offline transitions on a broadcast
//! channel. The offline store and the connection manager both subscribe.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

const EVENT_CAPACITY: usize = 16;

/// A change in host connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    Online,
    Offline,
}

impl NetworkEvent {
    pub fn from_online(online: bool) -> Self {
        if online {
            NetworkEvent::Online
        } else {
            NetworkEvent::Offline
        }
    }
}

/// Source of host connectivity transitions.
pub trait NetworkObserver: Send + Sync {
    /// Receive every transition published after this call.
    fn subscribe(&self) -> broadcast::Receiver<NetworkEvent>;

    /// Connectivity as last observed.
    fn is_online(&self) -> bool;
}

/// Shared state for observers: the last known value and the event channel.
#[derive(Debug)]
struct Reachability {
    online: AtomicBool,
    events: broadcast::Sender<NetworkEvent>,
}

impl Reachability {
    fn new(online: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            online: AtomicBool::new(online),
            events,
        }
    }

    /// Store `online` and publish an event if it changed.
    fn update(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }
        // No receivers is fine; the value is still recorded.
        let _ = self.events.send(NetworkEvent::from_online(online));
        true
    }
}

// ============================================================================
// MANUAL OBSERVER
// ============================================================================

/// Observer driven by the application (or tests) calling [`set_online`].
///
/// [`set_online`]: ManualNetworkObserver::set_online
#[derive(Debug)]
pub struct ManualNetworkObserver {
    state: Reachability,
}

impl ManualNetworkObserver {
    pub fn new(online: bool) -> Self {
        Self {
            state: Reachability::new(online),
        }
    }

    /// Record the host's connectivity. Publishes only when the value changes.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.state.update(online);
        if changed {
            tracing::debug!(online, "Network state changed");
        }
        changed
    }
}

impl Default for ManualNetworkObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkObserver for ManualNetworkObserver {
    fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.state.events.subscribe()
    }

    fn is_online(&self) -> bool {
        self.state.online.load(Ordering::SeqCst)
    }
}

// ============================================================================
// TCP REACHABILITY OBSERVER
// ============================================================================

/// Observer that polls a TCP address and reports whether it accepts connections.
///
/// Starts out assuming the host is online; the first failed poll publishes
/// [`NetworkEvent::Offline`]. Polling stops on [`stop`] or when dropped.
///
/// [`stop`]: TcpReachabilityObserver::stop
#[derive(Debug)]
pub struct TcpReachabilityObserver {
    state: Arc<Reachability>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TcpReachabilityObserver {
    /// Start polling `addr` every `poll_interval`, giving each connect
    /// `connect_timeout`. Must be called inside a tokio runtime.
    pub fn spawn(addr: SocketAddr, poll_interval: Duration, connect_timeout: Duration) -> Self {
        let state = Arc::new(Reachability::new(true));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let poll_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::debug!(%addr, poll_interval_ms = poll_interval.as_millis() as u64, "Reachability polling started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let online = probe(addr, connect_timeout).await;
                        if poll_state.update(online) {
                            tracing::info!(%addr, online, "Host reachability changed");
                        }
                    }
                }
            }

            tracing::debug!(%addr, "Reachability polling stopped");
        });

        Self {
            state,
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Stop polling. The last observed value is kept.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

async fn probe(addr: SocketAddr, connect_timeout: Duration) -> bool {
    matches!(timeout(connect_timeout, TcpStream::connect(addr)).await, Ok(Ok(_)))
}

impl NetworkObserver for TcpReachabilityObserver {
    fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.state.events.subscribe()
    }

    fn is_online(&self) -> bool {
        self.state.online.load(Ordering::SeqCst)
    }
}

impl Drop for TcpReachabilityObserver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_manual_observer_emits_only_on_change() {
        let observer = ManualNetworkObserver::new(true);
        let mut rx = observer.subscribe();

        assert!(!observer.set_online(true));
        assert!(observer.set_online(false));
        assert!(!observer.set_online(false));
        assert!(observer.set_online(true));

        assert_eq!(rx.try_recv().unwrap(), NetworkEvent::Offline);
        assert_eq!(rx.try_recv().unwrap(), NetworkEvent::Online);
        assert!(rx.try_recv().is_err());
        assert!(observer.is_online());
    }

    #[tokio::test]
    async fn test_tcp_observer_detects_closed_port() {
        // Bind then drop to get an address nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let observer =
            TcpReachabilityObserver::spawn(addr, Duration::from_millis(20), Duration::from_millis(200));
        let mut rx = observer.subscribe();

        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("observer should report within the deadline")
            .unwrap();
        assert_eq!(event, NetworkEvent::Offline);
        assert!(!observer.is_online());
        observer.stop();
    }

    #[tokio::test]
    async fn test_tcp_observer_stays_online_for_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let observer =
            TcpReachabilityObserver::spawn(addr, Duration::from_millis(10), Duration::from_millis(200));
        let mut rx = observer.subscribe();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(observer.is_online());
        assert!(rx.try_recv().is_err());
        drop(listener);
    }
}
