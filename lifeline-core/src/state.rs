//! Connection state machine values and connection metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current state of the backing-store connection.
///
/// Exactly one value is current at any time. Only the connection manager
/// changes it, and only through its transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// A probe succeeded and the client is live
    Connected,
    /// An attempt loop is running
    Connecting,
    /// No client; nothing has been attempted or `disconnect()` was called
    #[default]
    Disconnected,
    /// The last probe failed
    Error,
    /// Degraded mode: the store is not attempted, reads go to the cache
    Offline,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
            ConnectionState::Offline => "offline",
        }
    }

    /// Only a connected client may run queries.
    pub fn is_usable(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters and timestamps describing connection attempts.
///
/// Owned by the connection manager; callers only ever see clones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    pub total_attempts: u64,
    pub successful_connections: u64,
    pub failed_connections: u64,
    pub last_connection_time: Option<DateTime<Utc>>,
    pub last_error_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Running two-term average of successful probe latency, in milliseconds.
    pub average_response_time: f64,
}

impl ConnectionMetrics {
    pub fn record_attempt(&mut self) {
        self.total_attempts += 1;
    }

    /// Record a successful connection probe that took `latency_ms`.
    ///
    /// The average is `(old + new) / 2`, so it weighs the latest sample at
    /// one half. The first sample is averaged against the initial zero.
    pub fn record_success(&mut self, latency_ms: f64, at: DateTime<Utc>) {
        self.successful_connections += 1;
        self.last_connection_time = Some(at);
        self.average_response_time = (self.average_response_time + latency_ms) / 2.0;
    }

    pub fn record_failure(&mut self, error: impl Into<String>, at: DateTime<Utc>) {
        self.failed_connections += 1;
        self.record_error(error, at);
    }

    /// Note an error without counting a failed connection (health checks, query errors).
    pub fn record_error(&mut self, error: impl Into<String>, at: DateTime<Utc>) {
        self.last_error_time = Some(at);
        self.last_error = Some(error.into());
    }

    /// Fraction of attempts that connected (0.0 when nothing was attempted).
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.successful_connections as f64 / self.total_attempts as f64
        }
    }
}
