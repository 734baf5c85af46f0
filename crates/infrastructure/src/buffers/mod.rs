//! Network buffer descriptors and the pool that owns their storage.
//!
//! Every descriptor's storage is allocated once when the pool is built and is
//! never moved afterwards, so the address of a payload stays valid while the
//! descriptor travels between driver, stack and application.

#[cfg(feature = "zero-copy")]
mod bridge;
mod descriptor;
mod pool;

#[cfg(feature = "zero-copy")]
pub use bridge::BridgeError;
pub use descriptor::{BufferOwner, NetworkBuffer};
pub use pool::{DriverLease, NetworkBufferPool, PoolStats};

/// Bytes reserved in front of every payload. The first four hold the
/// descriptor index so the bridge can cross-check a recovered descriptor.
pub const BUFFER_HEADER_OFFSET: usize = 10;
