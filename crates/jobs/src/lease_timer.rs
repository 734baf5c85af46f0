use ferrous_ipstack_application::ports::SelfEventSink;
use ferrous_ipstack_domain::{DomainError, StackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_RENEWAL_INTERVAL_SECS: u64 = 60;

/// Periodically asks the IP task to run the DHCP state machine.
///
/// The first tick fires one full period after start.
pub struct LeaseTimerJob {
    sink: Arc<dyn SelfEventSink>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl LeaseTimerJob {
    pub fn new(sink: Arc<dyn SelfEventSink>) -> Self {
        Self {
            sink,
            interval_secs: DEFAULT_RENEWAL_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting lease timer job");

        tokio::spawn(async move {
            let period = Duration::from_secs(self.interval_secs);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("LeaseTimerJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.sink.post_self_event(StackEvent::DhcpTick) {
                            Ok(()) => debug!("Lease timer tick posted"),
                            Err(DomainError::EventQueueClosed) => {
                                info!("LeaseTimerJob: IP task gone, stopping");
                                break;
                            }
                            Err(e) => warn!(error = %e, "Lease timer tick dropped"),
                        }
                    }
                }
            }
        });
    }
}
