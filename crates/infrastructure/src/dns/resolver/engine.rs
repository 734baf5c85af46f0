use super::transaction_ids::TransactionIds;
use crate::dns::codec::{MessageBuilder, ReplyParser, ReplyResult};
use crate::dns::transport::{DnsSocketHandle, DnsTransport, ReceiveOutcome};
use crate::net::InterfaceState;
use async_trait::async_trait;
use ferrous_ipstack_application::ports::HostnameResolver;
use ferrous_ipstack_domain::{
    AddressList, DnsServerAddr, DomainError, Hostname, ResolveError, TransactionId,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// States of one resolution sequence.
#[derive(Debug, PartialEq, Eq)]
enum ResolutionState {
    Idle,
    SocketOpening,
    AwaitingReply { deadline: Instant },
    Retrying,
    Done(Result<AddressList, ResolveError>),
}

impl ResolutionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SocketOpening => "socket_opening",
            Self::AwaitingReply { .. } => "awaiting_reply",
            Self::Retrying => "retrying",
            Self::Done(_) => "done",
        }
    }
}

/// Everything one call owns for its lifetime.
struct Sequence<'a> {
    hostname: &'a Hostname,
    id: TransactionId,
    timeout: Duration,
    retry_budget: u8,
    retries_used: u8,
    sends: u32,
    request: Option<Vec<u8>>,
    handle: Option<DnsSocketHandle>,
    malformed_reply: bool,
    abandon: CancellationToken,
}

/// Sends a query, waits a bounded time for the matching reply and retries up
/// to the caller's budget.
///
/// Every call opens its own socket and closes it on every exit path.
pub struct ResolutionEngine {
    transport: DnsTransport,
    server: SocketAddr,
    interface: InterfaceState,
    ids: TransactionIds,
}

impl ResolutionEngine {
    pub fn new(transport: DnsTransport, server: DnsServerAddr, interface: InterfaceState) -> Self {
        Self {
            transport,
            server: server.socket_addr(),
            interface,
            ids: TransactionIds::new(),
        }
    }

    pub fn with_transaction_ids(mut self, ids: TransactionIds) -> Self {
        self.ids = ids;
        self
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn transport(&self) -> &DnsTransport {
        &self.transport
    }

    /// Requests currently waiting for a reply.
    pub fn outstanding(&self) -> usize {
        self.ids.outstanding()
    }

    pub async fn resolve(
        &self,
        hostname: &Hostname,
        timeout: Duration,
        retry_budget: u8,
    ) -> Result<AddressList, ResolveError> {
        let guard = self.ids.allocate().ok_or_else(|| {
            ResolveError::SocketUnavailable("no free transaction identifier".to_string())
        })?;

        let mut seq = Sequence {
            hostname,
            id: guard.id(),
            timeout,
            retry_budget,
            retries_used: 0,
            sends: 0,
            request: None,
            handle: None,
            malformed_reply: false,
            abandon: self.interface.abandon_token(),
        };

        let mut state = ResolutionState::Idle;
        loop {
            let from = state.name();
            state = match state {
                ResolutionState::Idle => self.start(&seq),
                ResolutionState::SocketOpening => self.open_and_send(&mut seq).await,
                ResolutionState::AwaitingReply { deadline } => {
                    self.await_reply(&mut seq, deadline).await
                }
                ResolutionState::Retrying => self.retry(&mut seq),
                ResolutionState::Done(result) => {
                    if let Some(handle) = seq.handle.as_mut() {
                        self.transport.close(handle);
                    }
                    debug!(
                        id = %seq.id,
                        hostname = %seq.hostname,
                        sends = seq.sends,
                        outcome = result.as_ref().err().map_or("success", |e| e.as_str()),
                        "Resolution finished"
                    );
                    return result;
                }
            };
            debug!(id = %seq.id, from, to = state.name(), "Resolution state change");
        }
    }

    fn start(&self, seq: &Sequence<'_>) -> ResolutionState {
        if seq.abandon.is_cancelled() {
            debug!(id = %seq.id, "Interface down, not starting resolution");
            return ResolutionState::Done(Err(ResolveError::Abandoned));
        }
        ResolutionState::SocketOpening
    }

    async fn open_and_send(&self, seq: &mut Sequence<'_>) -> ResolutionState {
        if seq.abandon.is_cancelled() {
            return ResolutionState::Done(Err(ResolveError::Abandoned));
        }

        if seq.request.is_none() {
            match MessageBuilder::encode_request(seq.hostname, seq.id) {
                Ok(bytes) => seq.request = Some(bytes),
                Err(e) => {
                    return ResolutionState::Done(Err(ResolveError::InvalidHostname(
                        e.to_string(),
                    )))
                }
            }
        }

        if seq.handle.is_none() {
            match self.transport.open(seq.timeout).await {
                Ok(handle) => seq.handle = Some(handle),
                Err(e) => return ResolutionState::Done(Err(socket_unavailable(e))),
            }
        }

        let (Some(handle), Some(request)) = (seq.handle.as_ref(), seq.request.as_deref()) else {
            return ResolutionState::Done(Err(ResolveError::SocketUnavailable(
                "socket not open".to_string(),
            )));
        };

        seq.sends += 1;
        seq.malformed_reply = false;

        match self.transport.send(handle, self.server, request).await {
            Ok(sent) if sent == request.len() => ResolutionState::AwaitingReply {
                deadline: Instant::now() + seq.timeout,
            },
            Ok(sent) => {
                warn!(id = %seq.id, sent, expected = request.len(), "DNS query not fully sent");
                ResolutionState::Retrying
            }
            Err(e) => {
                warn!(id = %seq.id, error = %e, "DNS query send failed");
                ResolutionState::Retrying
            }
        }
    }

    async fn await_reply(&self, seq: &mut Sequence<'_>, deadline: Instant) -> ResolutionState {
        let Some(handle) = seq.handle.as_ref() else {
            return ResolutionState::Retrying;
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(id = %seq.id, "DNS reply deadline passed");
                return ResolutionState::Retrying;
            }

            let outcome = tokio::select! {
                biased;
                _ = seq.abandon.cancelled() => {
                    warn!(
                        id = %seq.id,
                        hostname = %seq.hostname,
                        "Resolution abandoned, interface down"
                    );
                    return ResolutionState::Done(Err(ResolveError::Abandoned));
                }
                outcome = self.transport.receive_within(handle, remaining) => outcome,
            };

            let datagram = match outcome {
                Ok(ReceiveOutcome::Datagram(datagram)) => datagram,
                Ok(ReceiveOutcome::TimedOut) => {
                    debug!(id = %seq.id, "DNS reply timed out");
                    return ResolutionState::Retrying;
                }
                Err(e) => {
                    warn!(id = %seq.id, error = %e, "DNS receive failed");
                    return ResolutionState::Retrying;
                }
            };

            if datagram.source != self.server {
                warn!(
                    id = %seq.id,
                    expected = %self.server,
                    received_from = %datagram.source,
                    "Discarding datagram from unexpected source"
                );
                continue;
            }

            let decoded = ReplyParser::decode_reply(datagram.payload.as_bytes());
            let matched = decoded.matches(seq.id);
            let received = decoded.identifier;

            match decoded.classify(seq.id) {
                ReplyResult::Success(addresses) => {
                    return ResolutionState::Done(Ok(addresses));
                }
                ReplyResult::NoSuchName => {
                    return ResolutionState::Done(Err(ResolveError::NoSuchName));
                }
                ReplyResult::ServerFailure => {
                    return ResolutionState::Done(Err(ResolveError::ServerFailure));
                }
                ReplyResult::Malformed => {
                    seq.malformed_reply |= matched;
                    debug!(id = %seq.id, received = ?received, "Discarding malformed DNS reply");
                }
                ReplyResult::Unsolicited => {
                    debug!(id = %seq.id, received = ?received, "Discarding unsolicited DNS reply");
                }
            }
        }
    }

    fn retry(&self, seq: &mut Sequence<'_>) -> ResolutionState {
        if seq.abandon.is_cancelled() {
            return ResolutionState::Done(Err(ResolveError::Abandoned));
        }

        if seq.retries_used < seq.retry_budget {
            seq.retries_used += 1;
            debug!(
                id = %seq.id,
                retry = seq.retries_used,
                budget = seq.retry_budget,
                "Retrying DNS query"
            );
            return ResolutionState::SocketOpening;
        }

        if seq.malformed_reply {
            ResolutionState::Done(Err(ResolveError::Malformed))
        } else {
            ResolutionState::Done(Err(ResolveError::Timeout))
        }
    }
}

fn socket_unavailable(e: DomainError) -> ResolveError {
    match e {
        DomainError::SocketUnavailable(reason) => ResolveError::SocketUnavailable(reason),
        other => ResolveError::SocketUnavailable(other.to_string()),
    }
}

#[async_trait]
impl HostnameResolver for ResolutionEngine {
    async fn resolve(
        &self,
        hostname: &Hostname,
        timeout: Duration,
        retry_budget: u8,
    ) -> Result<AddressList, ResolveError> {
        ResolutionEngine::resolve(self, hostname, timeout, retry_budget).await
    }
}
