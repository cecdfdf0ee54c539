//! LIFELINE Connection - Resilient Data Access
//!
//! [`ConnectionManager`] wraps a backing store reached through a
//! [`StoreConnector`]: it retries with exponential backoff, health-checks the
//! live client, and degrades to caller-supplied fallbacks (usually reads from
//! the [`OfflineStore`](lifeline_storage::OfflineStore)) when the store is
//! unreachable.
//!
//! ```ignore
//! let store = Arc::new(OfflineStore::in_memory(OfflineStoreConfig::default())?);
//! let manager = ConnectionManager::new(ConnectionConfig::from_env(), connector, store.clone())?;
//!
//! let profile = manager
//!     .execute_with_sync_fallback(
//!         |client| async move { fetch_profile(&client).await },
//!         || store.get("profile").ok_or_else(|| LifelineError::query("no cached profile")),
//!     )
//!     .await?;
//! ```

pub mod connector;
mod health;
mod manager;

pub use connector::{StoreConnector, TcpClient, TcpConnector};
pub use manager::ConnectionManager;

pub use lifeline_core::{
    ConnectionConfig, ConnectionError, ConnectionMetrics, ConnectionState, HealthCheck,
    HealthStatus, LifelineConfig, LifelineError, LifelineResult,
};
