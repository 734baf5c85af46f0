pub mod lease_timer;
pub mod runner;

pub use lease_timer::LeaseTimerJob;
pub use runner::JobRunner;
