mod buffers;
mod dns;
mod errors;
mod logging;
mod root;
mod stack;

pub use buffers::BufferConfig;
pub use dns::{DnsConfig, MAX_RETRY_BUDGET};
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use stack::StackConfig;
