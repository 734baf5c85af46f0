use crate::errors::DomainError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DNS_PORT: u16 = 53;

/// Address of the DNS server queries are sent to.
///
/// Accepts `1.1.1.1`, `1.1.1.1:53`, `[2606:4700::1111]:53` and the
/// `udp://` prefixed forms of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DnsServerAddr(SocketAddr);

impl DnsServerAddr {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl FromStr for DnsServerAddr {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr_str = s.strip_prefix("udp://").unwrap_or(s).trim();

        if let Ok(addr) = addr_str.parse::<SocketAddr>() {
            return Ok(Self(addr));
        }
        if let Ok(ip) = addr_str.parse::<IpAddr>() {
            return Ok(Self(SocketAddr::new(ip, DNS_PORT)));
        }
        if let Some(inner) = addr_str.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Ok(ip) = inner.parse::<IpAddr>() {
                return Ok(Self(SocketAddr::new(ip, DNS_PORT)));
            }
        }

        Err(DomainError::InvalidServerAddress(format!(
            "Invalid DNS server address '{}'",
            s
        )))
    }
}

impl fmt::Display for DnsServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_port() {
        let addr: DnsServerAddr = "8.8.8.8:5353".parse().unwrap();
        assert_eq!(addr.socket_addr(), "8.8.8.8:5353".parse().unwrap());
    }

    #[test]
    fn test_parse_without_port_defaults_to_53() {
        let addr: DnsServerAddr = "1.1.1.1".parse().unwrap();
        assert_eq!(addr.socket_addr().port(), DNS_PORT);
    }

    #[test]
    fn test_parse_udp_prefix_and_ipv6() {
        let addr: DnsServerAddr = "udp://[2606:4700::1111]:53".parse().unwrap();
        assert!(addr.socket_addr().is_ipv6());

        let bare: DnsServerAddr = "[2606:4700::1111]".parse().unwrap();
        assert_eq!(bare.socket_addr().port(), DNS_PORT);
    }

    #[test]
    fn test_parse_hostname_rejected() {
        assert!("dns.google:53".parse::<DnsServerAddr>().is_err());
        assert!("".parse::<DnsServerAddr>().is_err());
    }
}
