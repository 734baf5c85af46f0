use crate::buffers::{NetworkBuffer, NetworkBufferPool};
use ferrous_ipstack_application::ports::{DatagramEndpoint, DatagramProvider};
use ferrous_ipstack_domain::DomainError;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Receive buffer size used when no descriptor pool is attached.
const OWNED_RECEIVE_LEN: usize = 1536;

/// Lifecycle of the sockets dedicated to DNS traffic.
///
/// Each resolution sequence opens one handle, uses it for every attempt and
/// closes it when it finishes. Receives land in a pool descriptor when a pool
/// is attached (zero-copy mode), otherwise in an owned buffer.
pub struct DnsTransport {
    provider: Arc<dyn DatagramProvider>,
    bind_addr: SocketAddr,
    receive_pool: Option<NetworkBufferPool>,
    stats: Arc<SocketCounters>,
}

#[derive(Default)]
struct SocketCounters {
    opened: AtomicU64,
    closed: AtomicU64,
}

/// Socket usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketStats {
    pub opened: u64,
    pub closed: u64,
}

impl SocketStats {
    pub fn open_now(&self) -> u64 {
        self.opened.saturating_sub(self.closed)
    }
}

/// An open DNS endpoint with its receive timeout.
///
/// Once closed the handle refuses every send and receive.
pub struct DnsSocketHandle {
    endpoint: Option<Box<dyn DatagramEndpoint>>,
    timeout: Duration,
    local_addr: Option<SocketAddr>,
}

impl DnsSocketHandle {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.endpoint.is_none()
    }

    fn endpoint(&self) -> Result<&dyn DatagramEndpoint, DomainError> {
        self.endpoint.as_deref().ok_or(DomainError::SocketClosed)
    }
}

/// Bytes of one received datagram.
pub enum DatagramPayload {
    Owned(Vec<u8>),
    /// Pool descriptor; returned to the pool when dropped.
    Pooled(NetworkBuffer),
}

impl DatagramPayload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Pooled(buffer) => buffer.payload(),
        }
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }
}

pub struct ReceivedDatagram {
    pub payload: DatagramPayload,
    pub source: SocketAddr,
}

pub enum ReceiveOutcome {
    Datagram(ReceivedDatagram),
    TimedOut,
}

impl DnsTransport {
    /// `bind_addr` is the local address every DNS socket binds to; port 0
    /// lets the system pick one.
    pub fn new(provider: Arc<dyn DatagramProvider>, bind_addr: SocketAddr) -> Self {
        Self {
            provider,
            bind_addr,
            receive_pool: None,
            stats: Arc::new(SocketCounters::default()),
        }
    }

    /// Receive into descriptors of `pool` instead of owned buffers.
    pub fn with_receive_pool(mut self, pool: NetworkBufferPool) -> Self {
        self.receive_pool = Some(pool);
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub async fn open(&self, timeout: Duration) -> Result<DnsSocketHandle, DomainError> {
        let endpoint = self.provider.bind(self.bind_addr).await.map_err(|e| {
            warn!(bind = %self.bind_addr, error = %e, "Failed to open DNS socket");
            match e {
                DomainError::SocketUnavailable(_) => e,
                other => DomainError::SocketUnavailable(other.to_string()),
            }
        })?;

        let local_addr = endpoint.local_addr();
        self.stats.opened.fetch_add(1, Ordering::Relaxed);
        debug!(local = ?local_addr, timeout_ms = timeout.as_millis() as u64, "DNS socket opened");

        Ok(DnsSocketHandle {
            endpoint: Some(endpoint),
            timeout,
            local_addr,
        })
    }

    /// Transmit one datagram. `Ok(0)` means nothing was queued.
    pub async fn send(
        &self,
        handle: &DnsSocketHandle,
        destination: SocketAddr,
        message: &[u8],
    ) -> Result<usize, DomainError> {
        let sent = handle.endpoint()?.send_to(message, destination).await?;
        debug!(server = %destination, bytes = message.len(), sent, "DNS query sent");
        Ok(sent)
    }

    /// Wait up to the handle's timeout for one datagram.
    pub async fn receive(&self, handle: &DnsSocketHandle) -> Result<ReceiveOutcome, DomainError> {
        self.receive_within(handle, handle.timeout).await
    }

    /// Wait up to `limit` for one datagram.
    pub async fn receive_within(
        &self,
        handle: &DnsSocketHandle,
        limit: Duration,
    ) -> Result<ReceiveOutcome, DomainError> {
        let endpoint = handle.endpoint()?;

        if let Some(pool) = &self.receive_pool {
            match pool.acquire() {
                Some(buffer) => return Self::receive_pooled(endpoint, buffer, limit).await,
                None => warn!("Buffer pool exhausted, receiving DNS reply into owned buffer"),
            }
        }

        let mut buf = vec![0u8; OWNED_RECEIVE_LEN];
        match tokio::time::timeout(limit, endpoint.recv_from(&mut buf)).await {
            Err(_) => Ok(ReceiveOutcome::TimedOut),
            Ok(result) => {
                let (len, source) = result?;
                buf.truncate(len);
                debug!(source = %source, bytes = len, "DNS datagram received");
                Ok(ReceiveOutcome::Datagram(ReceivedDatagram {
                    payload: DatagramPayload::Owned(buf),
                    source,
                }))
            }
        }
    }

    async fn receive_pooled(
        endpoint: &dyn DatagramEndpoint,
        mut buffer: NetworkBuffer,
        limit: Duration,
    ) -> Result<ReceiveOutcome, DomainError> {
        match tokio::time::timeout(limit, endpoint.recv_from(buffer.payload_mut())).await {
            Err(_) => Ok(ReceiveOutcome::TimedOut),
            Ok(result) => {
                let (len, source) = result?;
                buffer.set_length(len);
                buffer.set_source(source);
                debug!(
                    source = %source,
                    bytes = len,
                    descriptor = buffer.index(),
                    "DNS datagram received"
                );
                Ok(ReceiveOutcome::Datagram(ReceivedDatagram {
                    payload: DatagramPayload::Pooled(buffer),
                    source,
                }))
            }
        }
    }

    /// Release the endpoint. Closing an already closed handle does nothing.
    pub fn close(&self, handle: &mut DnsSocketHandle) {
        if let Some(endpoint) = handle.endpoint.take() {
            drop(endpoint);
            self.stats.closed.fetch_add(1, Ordering::Relaxed);
            debug!(local = ?handle.local_addr, "DNS socket closed");
        }
    }

    pub fn stats(&self) -> SocketStats {
        SocketStats {
            opened: self.stats.opened.load(Ordering::Relaxed),
            closed: self.stats.closed.load(Ordering::Relaxed),
        }
    }
}
