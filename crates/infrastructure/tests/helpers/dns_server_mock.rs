#![allow(dead_code)]
use super::builders::{ReplyBuilder, RCODE_NOERROR};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// Real UDP DNS server on loopback answering every query with fixed
/// addresses.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(answers: Vec<IpAddr>) -> Result<Self, std::io::Error> {
        Self::start_with(answers, 0).await
    }

    /// Stay silent for the first `ignore_first` queries.
    pub async fn start_with(
        answers: Vec<IpAddr>,
        ignore_first: usize,
    ) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let seen = Arc::clone(&queries);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        if len < 12 {
                            continue;
                        }
                        let n = seen.fetch_add(1, Ordering::SeqCst);
                        if n < ignore_first {
                            continue;
                        }
                        let reply = ReplyBuilder::answer(&buf[..len], RCODE_NOERROR, &answers);
                        let _ = socket.send_to(&reply, peer).await;
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
