#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_ipstack_application::ports::{DatagramEndpoint, DatagramProvider};
use ferrous_ipstack_domain::DomainError;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One datagram the mock "server" sends back.
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    pub bytes: Vec<u8>,
    pub from: SocketAddr,
}

/// Decides the replies to a query: `(query bytes, 0-based send number)`.
pub type Responder = Arc<dyn Fn(&[u8], usize) -> Vec<ScriptedReply> + Send + Sync>;

#[derive(Default)]
struct Counters {
    binds: AtomicUsize,
    sends: AtomicUsize,
    dropped_endpoints: AtomicUsize,
}

/// Datagram provider whose endpoints answer from a script instead of the
/// network.
#[derive(Clone)]
pub struct MockDatagramProvider {
    responder: Responder,
    counters: Arc<Counters>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    send_results: Arc<Mutex<VecDeque<usize>>>,
    fail_bind: bool,
}

impl MockDatagramProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[u8], usize) -> Vec<ScriptedReply> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            counters: Arc::new(Counters::default()),
            sent: Arc::new(Mutex::new(Vec::new())),
            send_results: Arc::new(Mutex::new(VecDeque::new())),
            fail_bind: false,
        }
    }

    /// A server that never answers.
    pub fn silent() -> Self {
        Self::new(|_, _| Vec::new())
    }

    pub fn failing_bind() -> Self {
        let mut provider = Self::silent();
        provider.fail_bind = true;
        provider
    }

    /// Override the byte counts reported by the next sends, in order.
    /// A scripted short send is not delivered to the responder.
    pub fn with_send_results(self, results: &[usize]) -> Self {
        self.send_results.lock().unwrap().extend(results.iter().copied());
        self
    }

    pub fn binds(&self) -> usize {
        self.counters.binds.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.counters.sends.load(Ordering::SeqCst)
    }

    pub fn dropped_endpoints(&self) -> usize {
        self.counters.dropped_endpoints.load(Ordering::SeqCst)
    }

    pub fn sent_queries(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatagramProvider for MockDatagramProvider {
    async fn bind(&self, local: SocketAddr) -> Result<Box<dyn DatagramEndpoint>, DomainError> {
        if self.fail_bind {
            return Err(DomainError::SocketUnavailable("no free sockets".to_string()));
        }
        self.counters.binds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockEndpoint {
            provider: self.clone(),
            local,
            inbox: Mutex::new(VecDeque::new()),
            arrived: Notify::new(),
        }))
    }
}

pub struct MockEndpoint {
    provider: MockDatagramProvider,
    local: SocketAddr,
    inbox: Mutex<VecDeque<ScriptedReply>>,
    arrived: Notify,
}

impl MockEndpoint {
    fn deliver(&self, replies: Vec<ScriptedReply>) {
        if replies.is_empty() {
            return;
        }
        self.inbox.lock().unwrap().extend(replies);
        self.arrived.notify_one();
    }
}

#[async_trait]
impl DatagramEndpoint for MockEndpoint {
    async fn send_to(&self, bytes: &[u8], _destination: SocketAddr) -> Result<usize, DomainError> {
        let attempt = self.provider.counters.sends.fetch_add(1, Ordering::SeqCst);
        self.provider.sent.lock().unwrap().push(bytes.to_vec());

        let scripted = self.provider.send_results.lock().unwrap().pop_front();
        if let Some(accepted) = scripted {
            if accepted < bytes.len() {
                return Ok(accepted);
            }
        }

        self.deliver((self.provider.responder)(bytes, attempt));
        Ok(bytes.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), DomainError> {
        loop {
            let next = self.inbox.lock().unwrap().pop_front();
            if let Some(reply) = next {
                let len = reply.bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&reply.bytes[..len]);
                if !self.inbox.lock().unwrap().is_empty() {
                    self.arrived.notify_one();
                }
                return Ok((len, reply.from));
            }
            self.arrived.notified().await;
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        Some(self.local)
    }
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        self.provider
            .counters
            .dropped_endpoints
            .fetch_add(1, Ordering::SeqCst);
    }
}
