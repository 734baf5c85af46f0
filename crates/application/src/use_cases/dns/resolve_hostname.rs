use crate::ports::HostnameResolver;
use ferrous_ipstack_domain::{AddressList, Hostname, ResolveError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Caller-facing entry point for name resolution.
///
/// Validates the hostname before any transport is touched and caps the
/// number of resolutions in flight at `max_outstanding`.
pub struct ResolveHostnameUseCase {
    resolver: Arc<dyn HostnameResolver>,
    default_timeout: Duration,
    default_retry_budget: u8,
    outstanding: Arc<Semaphore>,
}

impl ResolveHostnameUseCase {
    pub fn new(
        resolver: Arc<dyn HostnameResolver>,
        default_timeout: Duration,
        default_retry_budget: u8,
        max_outstanding: usize,
    ) -> Self {
        Self {
            resolver,
            default_timeout,
            default_retry_budget,
            outstanding: Arc::new(Semaphore::new(max_outstanding.max(1))),
        }
    }

    pub async fn execute(&self, hostname: &str) -> Result<AddressList, ResolveError> {
        self.execute_with(hostname, self.default_timeout, self.default_retry_budget)
            .await
    }

    pub async fn execute_with(
        &self,
        hostname: &str,
        timeout: Duration,
        retry_budget: u8,
    ) -> Result<AddressList, ResolveError> {
        let hostname = Hostname::parse(hostname).map_err(|e| {
            debug!(error = %e, "Rejected hostname");
            ResolveError::InvalidHostname(e.to_string())
        })?;

        let _permit = self
            .outstanding
            .acquire()
            .await
            .map_err(|_| ResolveError::Abandoned)?;

        let start = Instant::now();
        let result = self.resolver.resolve(&hostname, timeout, retry_budget).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(addresses) => info!(
                hostname = %hostname,
                addresses = ?addresses.as_slice(),
                elapsed_ms,
                "Hostname resolved"
            ),
            Err(e) => warn!(
                hostname = %hostname,
                status = e.as_str(),
                elapsed_ms,
                "Hostname resolution failed"
            ),
        }

        result
    }

    /// Resolutions that could start right now without waiting.
    pub fn available_slots(&self) -> usize {
        self.outstanding.available_permits()
    }
}
