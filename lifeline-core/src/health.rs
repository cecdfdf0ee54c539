//! Unified health check types
//!
//! Health reporting for the connection manager and anything else that wants
//! to surface whether the data path is live, degraded or down.

use crate::state::ConnectionState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Health status for a service or component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is fully operational
    Healthy,
    /// Component is operational but degraded (serving from cache)
    Degraded,
    /// Component is not operational
    Unhealthy,
    /// Health status is unknown (e.g., not yet checked)
    Unknown,
}

impl From<ConnectionState> for HealthStatus {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Connected => HealthStatus::Healthy,
            ConnectionState::Offline => HealthStatus::Degraded,
            ConnectionState::Error => HealthStatus::Unhealthy,
            ConnectionState::Connecting | ConnectionState::Disconnected => HealthStatus::Unknown,
        }
    }
}

/// Detailed health check result for a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall health status
    pub status: HealthStatus,
    /// Component name
    pub component: String,
    /// Detailed status message
    pub message: Option<String>,
    /// Response time in milliseconds (if applicable)
    pub response_time_ms: Option<f64>,
    /// Additional metadata
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl HealthCheck {
    pub fn new(status: HealthStatus, component: impl Into<String>) -> Self {
        Self {
            status,
            component: component.into(),
            message: None,
            response_time_ms: None,
            metadata: None,
        }
    }

    /// Create a healthy check result.
    pub fn healthy(component: impl Into<String>) -> Self {
        Self::new(HealthStatus::Healthy, component)
    }

    /// Create a degraded check result.
    pub fn degraded(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(HealthStatus::Degraded, component).with_message(message)
    }

    /// Create an unhealthy check result.
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(HealthStatus::Unhealthy, component).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the response time.
    pub fn with_response_time(mut self, ms: f64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_connection_state() {
        assert_eq!(HealthStatus::from(ConnectionState::Connected), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from(ConnectionState::Offline), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from(ConnectionState::Error), HealthStatus::Unhealthy);
        assert_eq!(HealthStatus::from(ConnectionState::Connecting), HealthStatus::Unknown);
    }

    #[test]
    fn test_builder() {
        let check = HealthCheck::degraded("store", "serving from cache")
            .with_response_time(12.5)
            .with_metadata("attempts", serde_json::json!(3));

        assert_eq!(check.status, HealthStatus::Degraded);
        assert_eq!(check.message.as_deref(), Some("serving from cache"));
        assert_eq!(check.response_time_ms, Some(12.5));
        assert_eq!(
            check.metadata.as_ref().and_then(|m| m.get("attempts")),
            Some(&serde_json::json!(3))
        );
        assert!(!check.is_healthy());
    }
}
