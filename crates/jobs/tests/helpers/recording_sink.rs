use ferrous_ipstack_application::ports::SelfEventSink;
use ferrous_ipstack_domain::{DomainError, StackEvent};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Event sink that records every post and can fail on demand.
#[derive(Default)]
pub struct RecordingSink {
    posted: Mutex<Vec<StackEvent>>,
    attempts: Mutex<usize>,
    failures: Mutex<VecDeque<DomainError>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next posts with `errors`, in order.
    pub fn failing_with(errors: Vec<DomainError>) -> Arc<Self> {
        let sink = Self::default();
        *sink.failures.lock().unwrap() = errors.into();
        Arc::new(sink)
    }

    pub fn posted(&self) -> Vec<StackEvent> {
        self.posted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl SelfEventSink for RecordingSink {
    fn post_self_event(&self, event: StackEvent) -> Result<(), DomainError> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.posted.lock().unwrap().push(event);
        Ok(())
    }
}
