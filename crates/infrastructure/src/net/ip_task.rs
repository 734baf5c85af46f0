use super::event_bridge::IpTaskEventBridge;
use crate::buffers::NetworkBufferPool;
use ferrous_ipstack_application::ports::{DhcpStateMachine, FrameHandler, NetworkInterfaceDriver};
use ferrous_ipstack_domain::{LinkStatus, StackEvent};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Delay before a failed interface initialisation is retried.
pub const DEFAULT_INIT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// The single task that owns interface bring-up and processes stack events
/// in queue order.
pub struct IpTask {
    events: mpsc::Receiver<StackEvent>,
    bridge: IpTaskEventBridge,
    pool: NetworkBufferPool,
    driver: Arc<dyn NetworkInterfaceDriver>,
    dhcp: Option<Arc<dyn DhcpStateMachine>>,
    frames: Option<Arc<dyn FrameHandler>>,
    dhcp_reset: bool,
    low_water_mark: usize,
    init_retry_delay: Duration,
}

impl IpTask {
    pub fn new(
        events: mpsc::Receiver<StackEvent>,
        bridge: IpTaskEventBridge,
        pool: NetworkBufferPool,
        driver: Arc<dyn NetworkInterfaceDriver>,
    ) -> Self {
        let low_water_mark = pool.stats().low_water_mark;
        Self {
            events,
            bridge,
            pool,
            driver,
            dhcp: None,
            frames: None,
            dhcp_reset: false,
            low_water_mark,
            init_retry_delay: DEFAULT_INIT_RETRY_DELAY,
        }
    }

    /// Acquire the address through DHCP instead of static configuration.
    pub fn with_dhcp(mut self, dhcp: Arc<dyn DhcpStateMachine>) -> Self {
        self.dhcp = Some(dhcp);
        self
    }

    pub fn with_frame_handler(mut self, frames: Arc<dyn FrameHandler>) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn with_init_retry_delay(mut self, delay: Duration) -> Self {
        self.init_retry_delay = delay;
        self
    }

    /// Bring the interface up, then process events until `Shutdown`, the
    /// token is cancelled or every sender is gone.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interface = self.driver.name(),
            dhcp = self.dhcp.is_some(),
            "IP task started"
        );

        self.handle_network_down().await;

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            if self.process(event).await.is_break() {
                break;
            }

            if self.bridge.take_pending_network_down() {
                self.handle_network_down().await;
            }

            self.log_resource_stats();
        }

        self.bridge.on_interface_down();
        info!("IP task stopped");
    }

    async fn process(&mut self, event: StackEvent) -> ControlFlow<()> {
        debug!(event = event.kind(), "Processing stack event");

        match event {
            StackEvent::NetworkDown => self.handle_network_down().await,
            StackEvent::NetworkUp => self.bridge.on_interface_up(),
            StackEvent::DhcpTick => self.handle_dhcp_tick().await,
            StackEvent::PacketReceived(address) => {
                #[cfg(feature = "zero-copy")]
                self.handle_packet(address);
                #[cfg(not(feature = "zero-copy"))]
                warn!(address = %address, "Zero-copy receive not compiled in, frame ignored");
            }
            StackEvent::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    async fn handle_network_down(&mut self) {
        let reclaimed = self.bridge.on_interface_down();
        if reclaimed > 0 {
            debug!(reclaimed, "Driver buffers returned to pool");
        }

        if let Err(e) = self.driver.initialise().await {
            warn!(
                interface = self.driver.name(),
                error = %e,
                retry_ms = self.init_retry_delay.as_millis() as u64,
                "Interface initialisation failed"
            );
            let bridge = self.bridge.clone();
            let delay = self.init_retry_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                bridge.report_network_down();
            });
            return;
        }

        info!(interface = self.driver.name(), "Network interface initialised");

        if self.dhcp.is_some() {
            self.dhcp_reset = true;
            if let Err(e) = self.bridge.send_dhcp_event() {
                warn!(error = %e, "Could not schedule DHCP restart");
            }
        } else {
            self.bridge.on_interface_up();
        }
    }

    async fn handle_dhcp_tick(&mut self) {
        let Some(dhcp) = self.dhcp.clone() else {
            debug!("DHCP disabled, tick ignored");
            return;
        };

        let reset = std::mem::take(&mut self.dhcp_reset);
        match dhcp.process(reset).await {
            Ok(LinkStatus::Up) => self.bridge.on_interface_up(),
            Ok(LinkStatus::Down) => debug!(reset, "DHCP lease not bound yet"),
            Err(e) => warn!(error = %e, "DHCP processing failed"),
        }
    }

    #[cfg(feature = "zero-copy")]
    fn handle_packet(&self, address: ferrous_ipstack_domain::PayloadAddress) {
        match self.pool.buffer_from_address(address) {
            Ok(buffer) => match &self.frames {
                Some(frames) => frames.handle_frame(buffer.payload()),
                None => debug!(len = buffer.len(), "No frame handler, frame dropped"),
            },
            Err(e) => warn!(address = %address, error = %e, "Driver frame rejected"),
        }
    }

    fn log_resource_stats(&mut self) {
        let stats = self.pool.stats();
        if stats.low_water_mark < self.low_water_mark {
            self.low_water_mark = stats.low_water_mark;
            info!(
                total = stats.total,
                free = stats.free,
                low_water_mark = stats.low_water_mark,
                driver_owned = stats.driver_owned,
                stack_owned = stats.stack_owned,
                application_owned = stats.application_owned,
                "Network buffer low-water mark decreased"
            );
        }
    }
}
