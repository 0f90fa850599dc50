// Shared transport configuration for building reqwest::Client instances.
//
// Every upstream client goes through this so timeout and user-agent
// settings live in one place.

use std::time::Duration;

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. The lighting bridge sits on the local network
    /// and answers in milliseconds; the public APIs get the same budget.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("heimdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }
}
