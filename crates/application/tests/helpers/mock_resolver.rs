use async_trait::async_trait;
use ferrous_ipstack_application::ports::HostnameResolver;
use ferrous_ipstack_domain::{AddressList, Hostname, ResolveError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct MockHostnameResolver {
    responses: Arc<RwLock<HashMap<String, Result<AddressList, ResolveError>>>>,
    calls: Arc<RwLock<Vec<(String, Duration, u8)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockHostnameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_response(&self, hostname: &str, response: Result<AddressList, ResolveError>) {
        self.responses
            .write()
            .unwrap()
            .insert(hostname.to_string(), response);
    }

    pub fn calls(&self) -> Vec<(String, Duration, u8)> {
        self.calls.read().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostnameResolver for MockHostnameResolver {
    async fn resolve(
        &self,
        hostname: &Hostname,
        timeout: Duration,
        retry_budget: u8,
    ) -> Result<AddressList, ResolveError> {
        self.calls
            .write()
            .unwrap()
            .push((hostname.to_string(), timeout, retry_budget));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .read()
            .unwrap()
            .get(hostname.as_str())
            .cloned()
            .unwrap_or(Err(ResolveError::NoSuchName))
    }
}
