use async_trait::async_trait;
use ferrous_ipstack_domain::DomainError;
use std::net::SocketAddr;

/// One bound, connectionless endpoint of the underlying socket layer.
#[async_trait]
pub trait DatagramEndpoint: Send + Sync {
    /// Queue one datagram. Returns the number of bytes accepted, which may be 0.
    async fn send_to(&self, bytes: &[u8], destination: SocketAddr) -> Result<usize, DomainError>;

    /// Wait for one datagram. No timeout: callers bound the wait themselves.
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), DomainError>;

    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}

/// Socket allocator of the underlying transport.
#[async_trait]
pub trait DatagramProvider: Send + Sync {
    async fn bind(&self, local: SocketAddr) -> Result<Box<dyn DatagramEndpoint>, DomainError>;
}
