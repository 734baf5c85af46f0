#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_ipstack_application::ports::{DhcpStateMachine, FrameHandler, NetworkInterfaceDriver};
use ferrous_ipstack_domain::{DomainError, LinkStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockInterfaceDriver {
    initialised: AtomicUsize,
    failures_left: AtomicUsize,
}

impl MockInterfaceDriver {
    pub fn new() -> Arc<Self> {
        Self::failing_first(0)
    }

    /// Fails the first `failures` initialisations.
    pub fn failing_first(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            initialised: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(failures),
        })
    }

    pub fn initialise_calls(&self) -> usize {
        self.initialised.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkInterfaceDriver for MockInterfaceDriver {
    async fn initialise(&self) -> Result<(), DomainError> {
        self.initialised.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(DomainError::InterfaceInit("PHY not ready".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock0"
    }
}

/// DHCP state machine returning scripted statuses, then `Up`.
pub struct MockDhcp {
    script: Mutex<VecDeque<LinkStatus>>,
    resets: Mutex<Vec<bool>>,
}

impl MockDhcp {
    pub fn new(script: &[LinkStatus]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.iter().copied().collect()),
            resets: Mutex::new(Vec::new()),
        })
    }

    /// `reset` flag of every call so far.
    pub fn calls(&self) -> Vec<bool> {
        self.resets.lock().unwrap().clone()
    }
}

#[async_trait]
impl DhcpStateMachine for MockDhcp {
    async fn process(&self, reset: bool) -> Result<LinkStatus, DomainError> {
        self.resets.lock().unwrap().push(reset);
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or(LinkStatus::Up))
    }
}

#[derive(Default)]
pub struct RecordingFrameHandler {
    frames: Mutex<Vec<Vec<u8>>>,
}

impl RecordingFrameHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }
}

impl FrameHandler for RecordingFrameHandler {
    fn handle_frame(&self, frame: &[u8]) {
        self.frames.lock().unwrap().push(frame.to_vec());
    }
}
