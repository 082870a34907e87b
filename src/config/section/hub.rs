//! `[hub]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [hub]
//! client_queue = 256          # Messages buffered per client before it is dropped
//! log_capacity = 200          # Log entries replayed to new clients
//! write_timeout_ms = 10000    # Per-message write timeout on client sockets
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actor::hub::{DEFAULT_CLIENT_QUEUE, DEFAULT_LOG_CAPACITY, HubOptions};

/// Hub and client connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Outbound queue capacity per client. A client that lets it fill up
    /// is disconnected.
    pub client_queue: usize,

    /// Number of log entries kept for replay.
    pub log_capacity: usize,

    /// Write timeout for one message, in milliseconds.
    pub write_timeout_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            client_queue: DEFAULT_CLIENT_QUEUE,
            log_capacity: DEFAULT_LOG_CAPACITY,
            write_timeout_ms: 10_000,
        }
    }
}

impl HubConfig {
    pub fn options(&self) -> HubOptions {
        HubOptions {
            client_queue: self.client_queue,
            log_capacity: self.log_capacity,
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_hub_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.hub.client_queue, 256);
        assert_eq!(config.hub.log_capacity, 200);
        assert_eq!(config.hub.write_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_hub_config_options() {
        let config = test_parse_config("[hub]\nclient_queue = 16\nlog_capacity = 5");
        let options = config.hub.options();
        assert_eq!(options.client_queue, 16);
        assert_eq!(options.log_capacity, 5);
    }
}
