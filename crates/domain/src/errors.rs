use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    #[error("Invalid server address: {0}")]
    InvalidServerAddress(String),

    #[error("Failed to create DNS socket: {0}")]
    SocketUnavailable(String),

    #[error("DNS socket already closed")]
    SocketClosed,

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Failed to encode DNS message: {0}")]
    EncodeFailed(String),

    #[error("Network interface initialisation failed: {0}")]
    InterfaceInit(String),

    #[error("DHCP error: {0}")]
    Dhcp(String),

    #[error("IP task event queue full, dropped {0}")]
    EventQueueFull(&'static str),

    #[error("IP task event queue closed")]
    EventQueueClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
