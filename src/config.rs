//! Server configuration.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 50_000;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30_000;

/// Settings fixed at process start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listening socket to.
    pub bind_address: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Idle window after which a silent connection is told goodbye.
    pub idle_timeout: Duration,
    /// Collect per-command latency metrics.
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            metrics: false,
        }
    }
}

impl ServerConfig {
    /// The idle window in whole milliseconds, as reported in the timeout
    /// goodbye message.
    pub fn idle_timeout_ms(&self) -> u64 {
        self.idle_timeout.as_millis() as u64
    }
}
