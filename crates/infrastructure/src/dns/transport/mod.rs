mod socket;
pub mod udp;

pub use socket::{
    DatagramPayload, DnsSocketHandle, DnsTransport, ReceiveOutcome, ReceivedDatagram,
    SocketStats,
};
pub use udp::UdpDatagramProvider;
