use super::StackServices;
use ferrous_ipstack_application::use_cases::ResolveHostnameUseCase;
use ferrous_ipstack_domain::Config;
use ferrous_ipstack_infrastructure::dns::{DnsTransport, ResolutionEngine, UdpDatagramProvider};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub engine: Arc<ResolutionEngine>,
    pub resolve: Arc<ResolveHostnameUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config, stack: &StackServices) -> anyhow::Result<Self> {
        let server = config.dns.primary_server()?;
        let bind_addr = match server.socket_addr() {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.dns.local_port)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, config.dns.local_port)),
        };

        let mut transport = DnsTransport::new(Arc::new(UdpDatagramProvider::new()), bind_addr);
        if config.buffers.zero_copy {
            transport = transport.with_receive_pool(stack.pool.clone());
        }

        info!(
            server = %server,
            bind = %bind_addr,
            timeout_ms = config.dns.query_timeout_ms,
            retry_budget = config.dns.retry_budget,
            zero_copy = config.buffers.zero_copy,
            "DNS resolution engine configured"
        );

        let engine = Arc::new(ResolutionEngine::new(
            transport,
            server,
            stack.interface().clone(),
        ));
        let resolve = Arc::new(ResolveHostnameUseCase::new(
            engine.clone(),
            config.dns.query_timeout(),
            config.dns.retry_budget,
            config.dns.max_outstanding,
        ));

        Ok(Self { engine, resolve })
    }
}
