use async_trait::async_trait;
use ferrous_ipstack_domain::{DomainError, LinkStatus};

#[async_trait]
pub trait DhcpStateMachine: Send + Sync {
    /// Advance the lease state machine. `reset` restarts discovery from scratch.
    ///
    /// Returns `LinkStatus::Up` once a lease is bound.
    async fn process(&self, reset: bool) -> Result<LinkStatus, DomainError>;
}
