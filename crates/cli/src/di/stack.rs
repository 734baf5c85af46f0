use ferrous_ipstack_domain::{Config, LinkStatus};
use ferrous_ipstack_infrastructure::buffers::NetworkBufferPool;
use ferrous_ipstack_infrastructure::net::{
    HostInterface, InterfaceState, IpTask, IpTaskEventBridge,
};
use ferrous_ipstack_jobs::{JobRunner, LeaseTimerJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The IP task and the jobs feeding it.
pub struct StackServices {
    pub pool: NetworkBufferPool,
    pub bridge: IpTaskEventBridge,
    shutdown: CancellationToken,
    ip_task: JoinHandle<()>,
}

impl StackServices {
    pub async fn start(config: &Config) -> anyhow::Result<Self> {
        info!(
            interface = %config.stack.interface,
            dhcp = config.stack.use_dhcp,
            descriptors = config.buffers.descriptor_count,
            "Starting IP stack"
        );

        let pool = NetworkBufferPool::new(
            config.buffers.descriptor_count,
            config.buffers.payload_capacity,
        );
        let interface = InterfaceState::new(LinkStatus::Down);
        let (bridge, events) = IpTaskEventBridge::new(
            config.stack.event_queue_capacity,
            interface,
            pool.clone(),
        );

        let host = Arc::new(HostInterface::new(config.stack.interface.clone()));
        let mut ip_task = IpTask::new(events, bridge.clone(), pool.clone(), host.clone());
        if config.stack.use_dhcp {
            ip_task = ip_task.with_dhcp(host);
        }

        let shutdown = CancellationToken::new();
        let ip_task = tokio::spawn(ip_task.run(shutdown.clone()));

        if config.stack.use_dhcp && config.stack.lease_renewal_secs > 0 {
            let lease_timer = LeaseTimerJob::new(Arc::new(bridge.clone()))
                .with_interval(config.stack.lease_renewal_secs);
            JobRunner::new()
                .with_lease_timer(lease_timer)
                .with_shutdown_token(shutdown.clone())
                .start()
                .await;
        }

        Ok(Self {
            pool,
            bridge,
            shutdown,
            ip_task,
        })
    }

    pub fn interface(&self) -> &InterfaceState {
        self.bridge.interface()
    }

    /// Wait for the IP task to report the interface up.
    pub async fn wait_until_up(&self, limit: Duration) -> anyhow::Result<()> {
        tokio::time::timeout(limit, self.interface().wait_until_up())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Network interface did not come up within {}ms",
                    limit.as_millis()
                )
            })
    }

    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.ip_task.await {
            warn!(error = %e, "IP task ended abnormally");
        }
    }
}
