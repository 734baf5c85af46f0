use smallvec::SmallVec;
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

/// Resolved addresses in the order the answer section listed them.
pub type AddressList = SmallVec<[IpAddr; 4]>;

/// Identifier carried in the DNS header to pair a reply with its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u16);

impl TransactionId {
    pub fn get(self) -> u16 {
        self.0
    }

    pub fn wrapping_next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u16> for TransactionId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Terminal failure of one `resolve` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    #[error("DNS socket unavailable: {0}")]
    SocketUnavailable(String),

    #[error("Query timeout")]
    Timeout,

    #[error("Domain not found (NXDOMAIN)")]
    NoSuchName,

    #[error("DNS server failure")]
    ServerFailure,

    #[error("Malformed DNS reply")]
    Malformed,

    #[error("Resolution abandoned: network interface down")]
    Abandoned,
}

impl ResolveError {
    /// Negative answers from the server; retrying cannot change them.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::NoSuchName | Self::ServerFailure)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidHostname(_) => "INVALID_HOSTNAME",
            Self::SocketUnavailable(_) => "SOCKET_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::NoSuchName => "NXDOMAIN",
            Self::ServerFailure => "SERVFAIL",
            Self::Malformed => "MALFORMED",
            Self::Abandoned => "ABANDONED",
        }
    }
}
