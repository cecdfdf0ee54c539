//! LIFELINE Storage - Offline Cache
//!
//! The tiered offline store, its persistent-tier backends, host network
//! observers, and cached identity helpers.

pub mod backend;
pub mod network;
pub mod session;
mod stats;
mod store;

pub use backend::{InMemoryKeyValueStore, KeyValueStore, LmdbKeyValueStore};
pub use network::{ManualNetworkObserver, NetworkEvent, NetworkObserver, TcpReachabilityObserver};
pub use session::{SessionInfo, UserProfile};
pub use stats::CacheStats;
pub use store::OfflineStore;
