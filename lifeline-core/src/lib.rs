//! LIFELINE Core - Shared Types
//!
//! Connection state, metrics, cache entries, health reporting, the error
//! taxonomy and configuration. Every other LIFELINE crate depends on this.

pub mod clock;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod health;
pub mod state;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use clock::{duration_to_millis, Clock, EpochMillis, ManualClock, SystemClock};
pub use config::{ConnectionConfig, LifelineConfig, OfflineStoreConfig};
pub use entry::{CacheEntry, Validity};
pub use error::{
    ConfigError, ConnectionError, LifelineError, LifelineResult, QueryError, StorageError,
    TimeoutError,
};
pub use health::{HealthCheck, HealthStatus};
pub use state::{ConnectionMetrics, ConnectionState};
