use async_trait::async_trait;
use ferrous_ipstack_domain::DomainError;

#[async_trait]
pub trait NetworkInterfaceDriver: Send + Sync {
    /// (Re)initialise the physical interface after a link loss.
    async fn initialise(&self) -> Result<(), DomainError>;

    fn name(&self) -> &str;
}
