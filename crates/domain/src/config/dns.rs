use crate::errors::DomainError;
use crate::server_addr::DnsServerAddr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound accepted for `retry_budget`.
pub const MAX_RETRY_BUDGET: u8 = 5;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_retry_budget")]
    pub retry_budget: u8,

    /// Local port the DNS socket binds to; 0 lets the transport pick one.
    /// A fixed port limits `max_outstanding` to 1.
    #[serde(default)]
    pub local_port: u16,

    /// Bound on resolutions in flight at the same time.
    #[serde(default = "default_max_outstanding")]
    pub max_outstanding: usize,
}

impl DnsConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// The server queries go to (the first configured one).
    pub fn primary_server(&self) -> Result<DnsServerAddr, DomainError> {
        self.servers
            .first()
            .ok_or_else(|| DomainError::ConfigError("No DNS servers configured".to_string()))?
            .parse()
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            query_timeout_ms: default_query_timeout_ms(),
            retry_budget: default_retry_budget(),
            local_port: 0,
            max_outstanding: default_max_outstanding(),
        }
    }
}

fn default_servers() -> Vec<String> {
    vec!["1.1.1.1:53".to_string()]
}

fn default_query_timeout_ms() -> u64 {
    500
}

fn default_retry_budget() -> u8 {
    2
}

fn default_max_outstanding() -> usize {
    4
}
