use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StackConfig {
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Lease-timer period; 0 disables the job.
    #[serde(default = "default_lease_renewal_secs")]
    pub lease_renewal_secs: u64,

    #[serde(default = "default_true")]
    pub use_dhcp: bool,

    /// Host interface whose link state gates initialisation.
    #[serde(default = "default_interface")]
    pub interface: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: default_event_queue_capacity(),
            lease_renewal_secs: default_lease_renewal_secs(),
            use_dhcp: default_true(),
            interface: default_interface(),
        }
    }
}

fn default_event_queue_capacity() -> usize {
    32
}

fn default_lease_renewal_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_interface() -> String {
    "eth0".to_string()
}
