use super::interface_state::InterfaceState;
use crate::buffers::NetworkBufferPool;
use ferrous_ipstack_application::ports::SelfEventSink;
use ferrous_ipstack_domain::{DomainError, StackEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// Glue between the link layer, time-driven jobs and the IP task's queue.
///
/// Cheap to clone; every clone feeds the same queue and writes the same
/// interface state.
#[derive(Clone)]
pub struct IpTaskEventBridge {
    sender: mpsc::Sender<StackEvent>,
    interface: InterfaceState,
    pool: NetworkBufferPool,
    network_down_pending: Arc<AtomicBool>,
}

impl IpTaskEventBridge {
    /// Create the bridge and the receiving end of the IP task's queue.
    pub fn new(
        capacity: usize,
        interface: InterfaceState,
        pool: NetworkBufferPool,
    ) -> (Self, mpsc::Receiver<StackEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let bridge = Self {
            sender,
            interface,
            pool,
            network_down_pending: Arc::new(AtomicBool::new(false)),
        };
        (bridge, receiver)
    }

    pub fn interface(&self) -> &InterfaceState {
        &self.interface
    }

    /// Mark the interface down and abandon every resolution waiting on it.
    ///
    /// Buffers the driver still holds are reclaimed; returns how many.
    pub fn on_interface_down(&self) -> usize {
        if self.interface.set_down() {
            warn!("Network interface down, abandoning outstanding resolutions");
        } else {
            debug!("Network interface already down");
        }
        self.pool.reclaim_driver_owned()
    }

    pub(crate) fn on_interface_up(&self) {
        if self.interface.set_up() {
            info!("Network interface up");
        }
    }

    /// Enqueue an event on the IP task's own queue without waiting.
    pub fn post_self_event(&self, event: StackEvent) -> Result<(), DomainError> {
        let kind = event.kind();
        match self.sender.try_send(event) {
            Ok(()) => {
                debug!(event = kind, "Event posted to IP task");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(event = kind, "IP task event queue full, event dropped");
                Err(DomainError::EventQueueFull(kind))
            }
            Err(TrySendError::Closed(_)) => {
                debug!(event = kind, "IP task event queue closed");
                Err(DomainError::EventQueueClosed)
            }
        }
    }

    /// Ask the IP task to run the DHCP state machine.
    pub fn send_dhcp_event(&self) -> Result<(), DomainError> {
        self.post_self_event(StackEvent::DhcpTick)
    }

    /// Driver-side link loss notification.
    ///
    /// When the queue is full the event is remembered and picked up by the
    /// IP task after its current event, so a link loss is never lost.
    pub fn report_network_down(&self) {
        if self.post_self_event(StackEvent::NetworkDown).is_err() {
            self.network_down_pending.store(true, Ordering::Release);
        }
    }

    pub(crate) fn take_pending_network_down(&self) -> bool {
        self.network_down_pending.swap(false, Ordering::AcqRel)
    }
}

impl SelfEventSink for IpTaskEventBridge {
    fn post_self_event(&self, event: StackEvent) -> Result<(), DomainError> {
        IpTaskEventBridge::post_self_event(self, event)
    }
}
