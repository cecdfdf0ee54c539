//! Constants for LIFELINE
//!
//! Centralized defaults for the connection manager and the offline store.

// ============================================================================
// CONNECTION MANAGER
// ============================================================================

/// Default number of connection attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff (milliseconds).
pub const DEFAULT_BASE_RETRY_DELAY_MS: u64 = 1_000;

/// Default interval between health-check probes (seconds).
pub const DEFAULT_HEALTH_CHECK_INTERVAL_SECS: u64 = 30;

/// Default deadline for a single probe (milliseconds).
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// OFFLINE STORE
// ============================================================================

/// Default entry lifetime (seconds). 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Default schema version stamped on every cache entry.
pub const DEFAULT_STORE_VERSION: &str = "1.0.0";

/// Namespace prefix for persisted keys.
pub const DEFAULT_KEY_PREFIX: &str = "lifeline:";

/// Default LMDB map size (megabytes).
pub const DEFAULT_LMDB_MAP_SIZE_MB: usize = 64;

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Environment variable naming a TOML config file.
pub const CONFIG_PATH_ENV: &str = "LIFELINE_CONFIG";
