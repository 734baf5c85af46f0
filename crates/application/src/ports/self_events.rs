use ferrous_ipstack_domain::{DomainError, StackEvent};

/// Lets time-driven work enqueue events on the IP task's own queue.
pub trait SelfEventSink: Send + Sync {
    /// Non-blocking; fails with `EventQueueFull` instead of waiting.
    fn post_self_event(&self, event: StackEvent) -> Result<(), DomainError>;
}
