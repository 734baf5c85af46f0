//! Ferrous IP Stack Domain Layer
pub mod config;
pub mod errors;
pub mod hostname;
pub mod resolution;
pub mod server_addr;
pub mod stack_event;

pub use config::{
    BufferConfig, CliOverrides, Config, ConfigError, DnsConfig, LoggingConfig, StackConfig,
};
pub use errors::DomainError;
pub use hostname::Hostname;
pub use resolution::{AddressList, ResolveError, TransactionId};
pub use server_addr::DnsServerAddr;
pub use stack_event::{LinkStatus, PayloadAddress, StackEvent};
