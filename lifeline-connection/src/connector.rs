//! Backing-store collaborator.
//!
//! The manager never speaks to a data store directly. A [`StoreConnector`]
//! creates client handles and probes them; queries run through callbacks
//! that receive the handle.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lifeline_core::{ConnectionError, LifelineResult};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Creates and checks clients for one backing store.
///
/// # Implementation Requirements
///
/// - `create_client` may be called once per connection attempt; a handle
///   whose probe failed is dropped and never reused
/// - `probe` runs on its own task and may be abandoned on timeout, so it
///   must not leave shared state half-updated
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    type Client: Send + Sync + 'static;

    async fn create_client(&self) -> LifelineResult<Self::Client>;

    /// Cheap liveness check against the store.
    async fn probe(&self, client: &Self::Client) -> LifelineResult<()>;

    /// Release resources held by a client on `disconnect()`.
    async fn close(&self, _client: &Self::Client) {}
}

// ============================================================================
// TCP CONNECTOR
// ============================================================================

/// A live TCP session with the store.
#[derive(Debug)]
pub struct TcpClient {
    addr: SocketAddr,
    connected_at: DateTime<Utc>,
    stream: Mutex<TcpStream>,
}

impl TcpClient {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Exclusive access to the underlying stream for a query.
    pub async fn stream(&self) -> tokio::sync::MutexGuard<'_, TcpStream> {
        self.stream.lock().await
    }
}

/// Connector for stores reachable at a TCP address. The probe checks that
/// the address still accepts new connections.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: SocketAddr,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(addr: SocketAddr, connect_timeout: Duration) -> Self {
        Self {
            addr,
            connect_timeout,
        }
    }

    async fn open(&self) -> Result<TcpStream, String> {
        match timeout(self.connect_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "connect to {} timed out after {}ms",
                self.addr,
                self.connect_timeout.as_millis()
            )),
        }
    }
}

#[async_trait]
impl StoreConnector for TcpConnector {
    type Client = TcpClient;

    async fn create_client(&self) -> LifelineResult<TcpClient> {
        let stream = self
            .open()
            .await
            .map_err(|reason| ConnectionError::ClientCreation { reason })?;
        stream
            .set_nodelay(true)
            .map_err(|e| ConnectionError::ClientCreation {
                reason: e.to_string(),
            })?;

        Ok(TcpClient {
            addr: self.addr,
            connected_at: Utc::now(),
            stream: Mutex::new(stream),
        })
    }

    async fn probe(&self, client: &TcpClient) -> LifelineResult<()> {
        let probe = self
            .open()
            .await
            .map_err(|reason| ConnectionError::ProbeFailed { reason })?;
        drop(probe);

        client
            .stream()
            .await
            .peer_addr()
            .map(|_| ())
            .map_err(|e| {
                ConnectionError::ProbeFailed {
                    reason: e.to_string(),
                }
                .into()
            })
    }

    async fn close(&self, client: &TcpClient) {
        if let Err(e) = client.stream().await.shutdown().await {
            tracing::debug!(addr = %client.addr, error = %e, "TCP shutdown failed");
        }
    }
}
