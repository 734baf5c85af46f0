use async_trait::async_trait;
use ferrous_ipstack_domain::{AddressList, Hostname, ResolveError};
use std::time::Duration;

#[async_trait]
pub trait HostnameResolver: Send + Sync {
    /// Resolve `hostname`, waiting at most `timeout` per attempt and re-sending
    /// up to `retry_budget` times.
    async fn resolve(
        &self,
        hostname: &Hostname,
        timeout: Duration,
        retry_budget: u8,
    ) -> Result<AddressList, ResolveError>;
}
