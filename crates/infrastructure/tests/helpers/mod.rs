#![allow(dead_code)]
pub mod builders;
pub mod dns_server_mock;
pub mod mock_datagram;
pub mod mock_interface;

pub use builders::*;
pub use dns_server_mock::MockDnsServer;
pub use mock_datagram::{MockDatagramProvider, Responder, ScriptedReply};
pub use mock_interface::{MockDhcp, MockInterfaceDriver, RecordingFrameHandler};

use std::time::Duration;

/// Poll `condition` every 10ms, up to ~2s of (possibly paused) time.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
