use async_trait::async_trait;
use ferrous_ipstack_application::ports::{DhcpStateMachine, NetworkInterfaceDriver};
use ferrous_ipstack_domain::{DomainError, LinkStatus};
use std::path::PathBuf;
use tracing::debug;

const SYSFS_NET: &str = "/sys/class/net";

/// Interface whose link and address are managed by the host operating
/// system. Initialisation only checks the reported link state; the address
/// lease is whatever the host already holds.
pub struct HostInterface {
    name: String,
    sysfs_root: PathBuf,
}

impl HostInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sysfs_root: PathBuf::from(SYSFS_NET),
        }
    }

    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }

    async fn operstate(&self) -> Option<String> {
        let path = self.sysfs_root.join(&self.name).join("operstate");
        tokio::fs::read_to_string(&path)
            .await
            .ok()
            .map(|state| state.trim().to_string())
    }
}

#[async_trait]
impl NetworkInterfaceDriver for HostInterface {
    async fn initialise(&self) -> Result<(), DomainError> {
        match self.operstate().await.as_deref() {
            Some("down") => Err(DomainError::InterfaceInit(format!(
                "{}: link is down",
                self.name
            ))),
            Some(state) => {
                debug!(interface = %self.name, operstate = state, "Host interface state");
                Ok(())
            }
            None => {
                debug!(interface = %self.name, "No link state reported, assuming up");
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl DhcpStateMachine for HostInterface {
    async fn process(&self, reset: bool) -> Result<LinkStatus, DomainError> {
        debug!(interface = %self.name, reset, "Address lease held by host");
        Ok(LinkStatus::Up)
    }
}
