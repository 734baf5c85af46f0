use super::pool::PoolShared;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// Who currently holds a descriptor. Exactly one holder at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOwner {
    Free,
    Driver,
    Stack,
    Application,
}

impl BufferOwner {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Driver => "driver",
            Self::Stack => "stack",
            Self::Application => "application",
        }
    }
}

impl fmt::Display for BufferOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A packet buffer held by the stack or the application.
///
/// Moving the value moves ownership; dropping it returns the descriptor to
/// its pool.
pub struct NetworkBuffer {
    pub(super) pool: Arc<PoolShared>,
    pub(super) index: usize,
    pub(super) storage: Option<Box<[u8]>>,
    pub(super) length: usize,
    pub(super) owner: BufferOwner,
    pub(super) source: Option<SocketAddr>,
}

impl NetworkBuffer {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn owner(&self) -> BufferOwner {
        self.owner
    }

    /// Valid payload bytes.
    pub fn payload(&self) -> &[u8] {
        let offset = self.pool.header_offset;
        match &self.storage {
            Some(storage) => &storage[offset..offset + self.length],
            None => &[],
        }
    }

    /// The whole payload region, regardless of the current length.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let offset = self.pool.header_offset;
        match &mut self.storage {
            Some(storage) => &mut storage[offset..],
            None => &mut [],
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn capacity(&self) -> usize {
        self.pool.payload_capacity
    }

    /// Clamped to the payload capacity.
    pub fn set_length(&mut self, length: usize) {
        self.length = length.min(self.capacity());
    }

    /// Sender of the datagram this buffer carries, when known.
    pub fn source(&self) -> Option<SocketAddr> {
        self.source
    }

    pub fn set_source(&mut self, source: SocketAddr) {
        self.source = Some(source);
    }

    /// Address of the first storage byte (the descriptor base).
    pub fn base_addr(&self) -> usize {
        self.pool.slot_base(self.index)
    }

    /// Address of the first payload byte: `base_addr() + header offset`.
    pub fn payload_addr(&self) -> usize {
        self.base_addr() + self.pool.header_offset
    }

    /// Hand the buffer from the stack's receive path to the application.
    pub fn transfer_to_application(&mut self) {
        self.owner = BufferOwner::Application;
        self.pool.set_owner(self.index, BufferOwner::Application);
    }

    /// Give the buffer to a zero-copy driver for transmission. The driver
    /// refers to it by payload address from here on.
    #[cfg(feature = "zero-copy")]
    pub fn release_to_driver(mut self) -> ferrous_ipstack_domain::PayloadAddress {
        let address = self.payload_addr();
        if let Some(storage) = self.storage.take() {
            self.pool.park_with_driver(self.index, storage, self.length);
        }
        ferrous_ipstack_domain::PayloadAddress(address)
    }
}

impl Drop for NetworkBuffer {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.pool.release(self.index, storage);
        }
    }
}

impl fmt::Debug for NetworkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkBuffer")
            .field("index", &self.index)
            .field("owner", &self.owner)
            .field("length", &self.length)
            .field("source", &self.source)
            .finish()
    }
}
