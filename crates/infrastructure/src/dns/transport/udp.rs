//! UDP datagram provider backed by tokio sockets (RFC 1035 §4.2.1).
//!
//! Messages are sent as-is, no framing. Sockets are created through
//! `socket2` so buffer sizes can be set before binding.

use async_trait::async_trait;
use ferrous_ipstack_application::ports::{DatagramEndpoint, DatagramProvider};
use ferrous_ipstack_domain::DomainError;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::debug;

const RECV_BUFFER_SIZE: usize = 64 * 1024;
const SEND_BUFFER_SIZE: usize = 32 * 1024;

/// Creates real UDP sockets for the DNS transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpDatagramProvider;

impl UdpDatagramProvider {
    pub fn new() -> Self {
        Self
    }

    fn create_socket(local: SocketAddr) -> Result<UdpSocket, std::io::Error> {
        use socket2::{Domain, Protocol, Socket, Type};

        let domain = if local.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_recv_buffer_size(RECV_BUFFER_SIZE)?;
        socket.set_send_buffer_size(SEND_BUFFER_SIZE)?;
        socket.bind(&local.into())?;
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        UdpSocket::from_std(std_socket)
    }
}

#[async_trait]
impl DatagramProvider for UdpDatagramProvider {
    async fn bind(&self, local: SocketAddr) -> Result<Box<dyn DatagramEndpoint>, DomainError> {
        let socket = Self::create_socket(local).map_err(|e| {
            DomainError::SocketUnavailable(format!("bind {} failed: {}", local, e))
        })?;

        let local_addr = socket.local_addr().ok();
        debug!(local = ?local_addr, "UDP socket bound");

        Ok(Box::new(UdpEndpoint { socket, local_addr }))
    }
}

pub struct UdpEndpoint {
    socket: UdpSocket,
    local_addr: Option<SocketAddr>,
}

#[async_trait]
impl DatagramEndpoint for UdpEndpoint {
    async fn send_to(&self, bytes: &[u8], destination: SocketAddr) -> Result<usize, DomainError> {
        self.socket.send_to(bytes, destination).await.map_err(|e| {
            DomainError::IoError(format!("UDP send to {} failed: {}", destination, e))
        })
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), DomainError> {
        self.socket
            .recv_from(buf)
            .await
            .map_err(|e| DomainError::IoError(format!("UDP receive failed: {}", e)))
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}
