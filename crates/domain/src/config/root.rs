use serde::{Deserialize, Serialize};

use super::buffers::BufferConfig;
use super::dns::{DnsConfig, MAX_RETRY_BUDGET};
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::stack::StackConfig;
use crate::server_addr::DnsServerAddr;

/// Smallest payload that still holds a full UDP DNS message.
const MIN_PAYLOAD_CAPACITY: usize = 512;

/// Main configuration structure for the Ferrous IP stack
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// DNS client configuration (server, timeout, retries)
    #[serde(default)]
    pub dns: DnsConfig,

    /// Network buffer pool configuration
    #[serde(default)]
    pub buffers: BufferConfig,

    /// IP task configuration
    #[serde(default)]
    pub stack: StackConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-ipstack.toml in current directory
    /// 3. /etc/ferrous-ipstack/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(server) = overrides.dns_server {
            self.dns.servers = vec![server];
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.dns.query_timeout_ms = timeout;
        }
        if let Some(retries) = overrides.retry_budget {
            self.dns.retry_budget = retries;
        }
        if let Some(zero_copy) = overrides.zero_copy {
            self.buffers.zero_copy = zero_copy;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(interface) = overrides.interface {
            self.stack.interface = interface;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.servers.is_empty() {
            return Err(ConfigError::Validation(
                "No DNS servers configured".to_string(),
            ));
        }

        for server in &self.dns.servers {
            server
                .parse::<DnsServerAddr>()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }

        if self.dns.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "DNS query timeout cannot be 0".to_string(),
            ));
        }

        if self.dns.retry_budget > MAX_RETRY_BUDGET {
            return Err(ConfigError::Validation(format!(
                "DNS retry budget {} exceeds maximum of {}",
                self.dns.retry_budget, MAX_RETRY_BUDGET
            )));
        }

        if self.dns.max_outstanding == 0 {
            return Err(ConfigError::Validation(
                "max_outstanding must allow at least one resolution".to_string(),
            ));
        }

        // Every resolution binds its own socket, so a fixed port only
        // works with one resolution in flight.
        if self.dns.local_port != 0 && self.dns.max_outstanding > 1 {
            return Err(ConfigError::Validation(format!(
                "local_port {} requires max_outstanding = 1 (got {})",
                self.dns.local_port, self.dns.max_outstanding
            )));
        }

        if self.buffers.descriptor_count == 0 {
            return Err(ConfigError::Validation(
                "Buffer pool needs at least one descriptor".to_string(),
            ));
        }

        if self.buffers.payload_capacity < MIN_PAYLOAD_CAPACITY {
            return Err(ConfigError::Validation(format!(
                "Buffer payload capacity {} is below the {} byte minimum",
                self.buffers.payload_capacity, MIN_PAYLOAD_CAPACITY
            )));
        }

        if self.stack.interface.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Interface name cannot be empty".to_string(),
            ));
        }

        if self.stack.event_queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "Event queue capacity cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("ferrous-ipstack.toml").exists() {
            Some("ferrous-ipstack.toml".to_string())
        } else if std::path::Path::new("/etc/ferrous-ipstack/config.toml").exists() {
            Some("/etc/ferrous-ipstack/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_server: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub retry_budget: Option<u8>,
    pub zero_copy: Option<bool>,
    pub log_level: Option<String>,
    pub interface: Option<String>,
}
