use std::fmt;

/// Whether the network interface can currently carry traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    Up,
    #[default]
    Down,
}

impl LinkStatus {
    pub fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Address of a packet payload handed over by a zero-copy driver.
///
/// Carried as an integer so events stay `Send`; it is only turned back into
/// a descriptor through the buffer bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadAddress(pub usize);

impl fmt::Display for PayloadAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Work items processed by the IP task, in queue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    /// Driver reported link loss, or an explicit down request.
    NetworkDown,
    /// Address configuration finished; the interface is usable again.
    NetworkUp,
    /// DHCP state machine needs to run (lease renewal or restart).
    DhcpTick,
    /// Driver delivered a received frame by reference.
    PacketReceived(PayloadAddress),
    Shutdown,
}

impl StackEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkDown => "network_down",
            Self::NetworkUp => "network_up",
            Self::DhcpTick => "dhcp_tick",
            Self::PacketReceived(_) => "packet_received",
            Self::Shutdown => "shutdown",
        }
    }
}
