// Shared transport configuration for building reqwest::Client instances.
//
// The connect and total-request timeouts are both set from the same value,
// so one fetch never outlives the configured budget.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("linkwatch/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Hard upper bound for one fetch, connect included.
    pub timeout: Duration,
    /// Accept self-signed certificates (devices serving their page over https).
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            accept_invalid_certs: true,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(USER_AGENT);

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Client(e.to_string()))
    }
}
