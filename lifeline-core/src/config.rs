//! Configuration types
//!
//! Every option has a default from [`crate::constants`], can be overridden
//! from `LIFELINE_*` environment variables, and can be loaded from a TOML
//! file. Durations are written in milliseconds in files.

use crate::constants::*;
use crate::error::{ConfigError, LifelineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(crate::clock::duration_to_millis(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// ============================================================================
// CONNECTION MANAGER
// ============================================================================

/// Options recognized by the connection manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Attempts per `connect()` before giving up (>= 1)
    pub max_attempts: u32,
    /// Backoff base; attempt `n` waits `base * 2^(n-1)` before attempt `n+1`
    #[serde(rename = "base_retry_delay_ms", with = "duration_ms")]
    pub base_retry_delay: Duration,
    /// Period of the background health probe
    #[serde(rename = "health_check_interval_ms", with = "duration_ms")]
    pub health_check_interval: Duration,
    /// Deadline for a single probe
    #[serde(rename = "probe_timeout_ms", with = "duration_ms")]
    pub probe_timeout: Duration,
    /// Reconnect automatically when a health check fails
    pub enable_auto_retry: bool,
    /// Degrade to offline mode and route failures to fallbacks
    pub enable_offline_fallback: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_retry_delay: Duration::from_millis(DEFAULT_BASE_RETRY_DELAY_MS),
            health_check_interval: Duration::from_secs(DEFAULT_HEALTH_CHECK_INTERVAL_SECS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            enable_auto_retry: true,
            enable_offline_fallback: true,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create ConnectionConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `LIFELINE_MAX_ATTEMPTS` (default: 3)
    /// - `LIFELINE_BASE_RETRY_DELAY_MS` (default: 1000)
    /// - `LIFELINE_HEALTH_CHECK_INTERVAL_SECS` (default: 30)
    /// - `LIFELINE_PROBE_TIMEOUT_MS` (default: 5000)
    /// - `LIFELINE_AUTO_RETRY` (default: true)
    /// - `LIFELINE_OFFLINE_FALLBACK` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_parse("LIFELINE_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts),
            base_retry_delay: env_parse("LIFELINE_BASE_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_retry_delay),
            health_check_interval: env_parse("LIFELINE_HEALTH_CHECK_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.health_check_interval),
            probe_timeout: env_parse("LIFELINE_PROBE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.probe_timeout),
            enable_auto_retry: env_flag("LIFELINE_AUTO_RETRY")
                .unwrap_or(defaults.enable_auto_retry),
            enable_offline_fallback: env_flag("LIFELINE_OFFLINE_FALLBACK")
                .unwrap_or(defaults.enable_offline_fallback),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_retry_delay(mut self, delay: Duration) -> Self {
        self.base_retry_delay = delay;
        self
    }

    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_auto_retry(mut self, enabled: bool) -> Self {
        self.enable_auto_retry = enabled;
        self
    }

    pub fn with_offline_fallback(mut self, enabled: bool) -> Self {
        self.enable_offline_fallback = enabled;
        self
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_retry_delay.saturating_mul(factor)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - max_attempts >= 1
    /// - health_check_interval and probe_timeout are positive
    pub fn validate(&self) -> LifelineResult<()> {
        if self.max_attempts == 0 {
            return Err(invalid(
                "max_attempts",
                self.max_attempts.to_string(),
                "max_attempts must be at least 1",
            ));
        }

        if self.health_check_interval.is_zero() {
            return Err(invalid(
                "health_check_interval",
                format!("{:?}", self.health_check_interval),
                "health_check_interval must be positive",
            ));
        }

        if self.probe_timeout.is_zero() {
            return Err(invalid(
                "probe_timeout",
                format!("{:?}", self.probe_timeout),
                "probe_timeout must be positive",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// OFFLINE STORE
// ============================================================================

/// Options recognized by the offline store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfflineStoreConfig {
    /// Lifetime applied by `set()` and by fallback generators
    #[serde(rename = "default_ttl_ms", with = "duration_ms")]
    pub default_ttl: Duration,
    /// Entries written under any other version are treated as absent
    pub store_version: String,
    /// Namespace for persisted keys; `clear()` only touches this prefix
    pub key_prefix: String,
}

impl Default for OfflineStoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            store_version: DEFAULT_STORE_VERSION.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl OfflineStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create OfflineStoreConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `LIFELINE_DEFAULT_TTL_SECS` (default: 86400)
    /// - `LIFELINE_STORE_VERSION` (default: "1.0.0")
    /// - `LIFELINE_KEY_PREFIX` (default: "lifeline:")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env_parse("LIFELINE_DEFAULT_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            store_version: std::env::var("LIFELINE_STORE_VERSION")
                .unwrap_or(defaults.store_version),
            key_prefix: std::env::var("LIFELINE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_store_version(mut self, version: impl Into<String>) -> Self {
        self.store_version = version.into();
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> LifelineResult<()> {
        if self.default_ttl.is_zero() {
            return Err(invalid(
                "default_ttl",
                format!("{:?}", self.default_ttl),
                "default_ttl must be positive",
            ));
        }

        if self.store_version.trim().is_empty() {
            return Err(invalid(
                "store_version",
                self.store_version.clone(),
                "store_version must not be empty",
            ));
        }

        if self.key_prefix.is_empty() {
            return Err(invalid(
                "key_prefix",
                self.key_prefix.clone(),
                "key_prefix must not be empty",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// FILE CONFIGURATION
// ============================================================================

/// Top-level configuration file.
///
/// ```toml
/// [connection]
/// max_attempts = 5
/// base_retry_delay_ms = 250
///
/// [cache]
/// store_version = "2.1.0"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifelineConfig {
    pub connection: ConnectionConfig,
    pub cache: OfflineStoreConfig,
}

impl LifelineConfig {
    pub fn from_env() -> Self {
        Self {
            connection: ConnectionConfig::from_env(),
            cache: OfflineStoreConfig::from_env(),
        }
    }

    pub fn from_toml_str(contents: &str) -> LifelineResult<Self> {
        let config: LifelineConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> LifelineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load from the file named by `LIFELINE_CONFIG`, or from the environment.
    pub fn load() -> LifelineResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_path(path),
            Err(_) => {
                let config = Self::from_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> LifelineResult<()> {
        self.connection.validate()?;
        self.cache.validate()
    }
}

fn invalid(field: &str, value: String, reason: &str) -> crate::LifelineError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    }
    .into()
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|s| {
        matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}
