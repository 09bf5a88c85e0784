//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Deadlines are expressed in milliseconds so test configurations can use
//! sub-second values.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the demo binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP services to start and manage.
    pub services: Vec<HttpServiceConfig>,

    /// Shutdown sequencing deadlines.
    pub shutdown: ShutdownConfig,

    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: Option<String>,
}

/// A single managed HTTP service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServiceConfig {
    /// Service identifier for logging.
    pub name: String,

    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

/// Deadlines governing the shutdown sequence.
///
/// The global deadline is enforced by the force-shutdown race alone; the
/// per-call deadlines bound individual stop/callback members. The defaults
/// keep per-call deadlines well under the global one, but nothing maintains
/// that relationship if a caller overrides them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Global bound on the whole shutdown sequence, in milliseconds.
    pub shutdown_deadline_ms: u64,

    /// Bound on each individual service stop, in milliseconds.
    pub service_stop_deadline_ms: u64,

    /// Bound on each individual cleanup callback, in milliseconds.
    pub callback_deadline_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            shutdown_deadline_ms: 30_000,
            service_stop_deadline_ms: 10_000,
            callback_deadline_ms: 3_000,
        }
    }
}

impl ShutdownConfig {
    pub fn shutdown_deadline(&self) -> Duration {
        Duration::from_millis(self.shutdown_deadline_ms)
    }

    pub fn service_stop_deadline(&self) -> Duration {
        Duration::from_millis(self.service_stop_deadline_ms)
    }

    pub fn callback_deadline(&self) -> Duration {
        Duration::from_millis(self.callback_deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_defaults() {
        let config = ShutdownConfig::default();
        assert_eq!(config.shutdown_deadline(), Duration::from_secs(30));
        assert_eq!(config.service_stop_deadline(), Duration::from_secs(10));
        assert_eq!(config.callback_deadline(), Duration::from_secs(3));
    }

    #[test]
    fn test_minimal_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.services.is_empty());
        assert_eq!(config.shutdown.shutdown_deadline_ms, 30_000);
    }

    #[test]
    fn test_toml_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [shutdown]
            shutdown_deadline_ms = 300
            service_stop_deadline_ms = 100

            [[services]]
            name = "business"
            bind_address = "127.0.0.1:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.shutdown.shutdown_deadline_ms, 300);
        assert_eq!(config.shutdown.service_stop_deadline_ms, 100);
        assert_eq!(config.shutdown.callback_deadline_ms, 3_000);
        assert_eq!(config.services[0].name, "business");
    }
}
