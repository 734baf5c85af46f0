pub mod event_bridge;
pub mod host;
pub mod interface_state;
pub mod ip_task;

pub use event_bridge::IpTaskEventBridge;
pub use host::HostInterface;
pub use interface_state::InterfaceState;
pub use ip_task::{IpTask, DEFAULT_INIT_RETRY_DELAY};
