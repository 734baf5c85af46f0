mod datagram;
mod dhcp;
mod frame_handler;
mod hostname_resolver;
mod network_interface;
mod self_events;

pub use datagram::{DatagramEndpoint, DatagramProvider};
pub use dhcp::DhcpStateMachine;
pub use frame_handler::FrameHandler;
pub use hostname_resolver::HostnameResolver;
pub use network_interface::NetworkInterfaceDriver;
pub use self_events::SelfEventSink;
