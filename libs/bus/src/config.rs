//! Bus configuration
//!
//! Socket location and the timing/sizing knobs shared by clients and
//! subscribers. All fields have working defaults; builder-style setters
//! cover the common overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use types::DEFAULT_SOCKET_DIR;

/// Configuration for bus clients and subscriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Directory holding broker sockets (`<dir>/<server-name>`)
    pub socket_dir: PathBuf,
    /// Receive framing-buffer capacity per connection
    pub buffer_size: usize,
    /// Bound on connect + negotiation
    pub connect_timeout: Duration,
    /// Default bound for facade requests
    pub request_timeout: Duration,
    /// Housekeeping tick of the subscriber dispatch loop; also the
    /// upper bound on unregister latency
    pub dispatch_tick: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
            buffer_size: 8 * 1024,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            dispatch_tick: Duration::from_millis(500),
        }
    }
}

impl BusConfig {
    pub fn with_socket_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.socket_dir = dir.into();
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = BusConfig::default();
        assert_eq!(config.socket_dir, PathBuf::from(DEFAULT_SOCKET_DIR));
        assert!(config.buffer_size >= 1024);
        assert!(!config.connect_timeout.is_zero());
    }

    #[test]
    fn builder_overrides() {
        let config = BusConfig::default()
            .with_socket_dir("/run/test-bus")
            .with_buffer_size(4096);
        assert_eq!(config.socket_dir, PathBuf::from("/run/test-bus"));
        assert_eq!(config.buffer_size, 4096);
    }
}
