use super::descriptor::{BufferOwner, NetworkBuffer};
use super::BUFFER_HEADER_OFFSET;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Fixed-size arena of packet buffer descriptors.
///
/// Cloning is cheap and yields another handle to the same pool.
#[derive(Clone)]
pub struct NetworkBufferPool {
    shared: Arc<PoolShared>,
}

pub(super) struct PoolShared {
    pub(super) header_offset: usize,
    pub(super) payload_capacity: usize,
    /// `(base address, slot index)` sorted by address. Never changes.
    pub(super) bases: Vec<(usize, usize)>,
    slots: Mutex<PoolSlots>,
}

struct PoolSlots {
    slots: Vec<Slot>,
    low_water_mark: usize,
}

struct Slot {
    base: usize,
    /// Present while the pool or the driver holds the descriptor.
    storage: Option<Box<[u8]>>,
    owner: BufferOwner,
    length: usize,
}

impl NetworkBufferPool {
    pub fn new(descriptor_count: usize, payload_capacity: usize) -> Self {
        let header_offset = BUFFER_HEADER_OFFSET;
        let mut slots = Vec::with_capacity(descriptor_count);
        let mut bases = Vec::with_capacity(descriptor_count);

        for index in 0..descriptor_count {
            let mut storage = vec![0u8; header_offset + payload_capacity].into_boxed_slice();
            storage[..4].copy_from_slice(&(index as u32).to_le_bytes());
            let base = storage.as_ptr() as usize;
            bases.push((base, index));
            slots.push(Slot {
                base,
                storage: Some(storage),
                owner: BufferOwner::Free,
                length: 0,
            });
        }
        bases.sort_unstable();

        info!(
            descriptor_count,
            payload_capacity, header_offset, "Initializing network buffer pool"
        );

        Self {
            shared: Arc::new(PoolShared {
                header_offset,
                payload_capacity,
                bases,
                slots: Mutex::new(PoolSlots {
                    slots,
                    low_water_mark: descriptor_count,
                }),
            }),
        }
    }

    pub fn header_offset(&self) -> usize {
        self.shared.header_offset
    }

    pub fn payload_capacity(&self) -> usize {
        self.shared.payload_capacity
    }

    pub fn descriptor_count(&self) -> usize {
        self.shared.bases.len()
    }

    /// Take a free descriptor for the stack. `None` when the pool is exhausted.
    pub fn acquire(&self) -> Option<NetworkBuffer> {
        let (index, storage) = self.shared.take_free(BufferOwner::Stack)?;
        Some(NetworkBuffer {
            pool: Arc::clone(&self.shared),
            index,
            storage: Some(storage),
            length: 0,
            owner: BufferOwner::Stack,
            source: None,
        })
    }

    /// Take a free descriptor for the driver to receive into.
    pub fn acquire_for_driver(&self) -> Option<DriverLease> {
        let (index, storage) = self.shared.take_free(BufferOwner::Driver)?;
        Some(DriverLease {
            pool: Arc::clone(&self.shared),
            index,
            storage: Some(storage),
            length: 0,
        })
    }

    /// Return every descriptor the driver still holds to the free list.
    ///
    /// Used when the interface goes down: in-flight driver buffers will never
    /// be handed back.
    pub fn reclaim_driver_owned(&self) -> usize {
        let mut slots = self.shared.lock();
        let mut reclaimed = 0;
        for slot in slots.slots.iter_mut() {
            if slot.owner == BufferOwner::Driver && slot.storage.is_some() {
                slot.owner = BufferOwner::Free;
                slot.length = 0;
                reclaimed += 1;
            }
        }
        if reclaimed > 0 {
            warn!(reclaimed, "Reclaimed driver-owned network buffers");
        }
        reclaimed
    }

    pub fn stats(&self) -> PoolStats {
        let slots = self.shared.lock();
        let mut stats = PoolStats {
            total: slots.slots.len(),
            low_water_mark: slots.low_water_mark,
            ..PoolStats::default()
        };
        for slot in &slots.slots {
            match slot.owner {
                BufferOwner::Free => stats.free += 1,
                BufferOwner::Driver => stats.driver_owned += 1,
                BufferOwner::Stack => stats.stack_owned += 1,
                BufferOwner::Application => stats.application_owned += 1,
            }
        }
        stats
    }

    pub(super) fn shared(&self) -> &Arc<PoolShared> {
        &self.shared
    }
}

impl PoolShared {
    fn lock(&self) -> MutexGuard<'_, PoolSlots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_free(&self, owner: BufferOwner) -> Option<(usize, Box<[u8]>)> {
        let mut slots = self.lock();
        let index = slots
            .slots
            .iter()
            .position(|slot| slot.owner == BufferOwner::Free && slot.storage.is_some())?;

        let slot = &mut slots.slots[index];
        slot.owner = owner;
        slot.length = 0;
        let storage = slot.storage.take()?;

        let free = slots
            .slots
            .iter()
            .filter(|slot| slot.owner == BufferOwner::Free)
            .count();
        if free < slots.low_water_mark {
            slots.low_water_mark = free;
        }

        debug!(index, owner = %owner, free, "Network buffer acquired");
        Some((index, storage))
    }

    pub(super) fn slot_base(&self, index: usize) -> usize {
        self.bases
            .iter()
            .find(|(_, i)| *i == index)
            .map(|(base, _)| *base)
            .unwrap_or_default()
    }

    pub(super) fn set_owner(&self, index: usize, owner: BufferOwner) {
        if let Some(slot) = self.lock().slots.get_mut(index) {
            slot.owner = owner;
        }
    }

    pub(super) fn release(&self, index: usize, storage: Box<[u8]>) {
        let mut slots = self.lock();
        if let Some(slot) = slots.slots.get_mut(index) {
            debug_assert_eq!(slot.base, storage.as_ptr() as usize);
            slot.storage = Some(storage);
            slot.owner = BufferOwner::Free;
            slot.length = 0;
            debug!(index, "Network buffer released");
        }
    }

    /// Keep the storage in the pool but record the driver as its holder.
    pub(super) fn park_with_driver(&self, index: usize, storage: Box<[u8]>, length: usize) {
        let mut slots = self.lock();
        if let Some(slot) = slots.slots.get_mut(index) {
            slot.storage = Some(storage);
            slot.owner = BufferOwner::Driver;
            slot.length = length;
        }
    }

    /// Move a driver-held descriptor to the stack. Returns the storage, the
    /// recorded length, or the current owner when it is not the driver.
    pub(super) fn claim_from_driver(
        &self,
        index: usize,
    ) -> Result<(Box<[u8]>, usize), BufferOwner> {
        let mut slots = self.lock();
        let slot = slots.slots.get_mut(index).ok_or(BufferOwner::Free)?;
        if slot.owner != BufferOwner::Driver {
            return Err(slot.owner);
        }
        let storage = slot.storage.take().ok_or(slot.owner)?;
        slot.owner = BufferOwner::Stack;
        Ok((storage, slot.length))
    }

    /// Put storage back after a failed claim without changing the owner.
    pub(super) fn restore_to_driver(&self, index: usize, storage: Box<[u8]>) {
        let mut slots = self.lock();
        if let Some(slot) = slots.slots.get_mut(index) {
            slot.storage = Some(storage);
            slot.owner = BufferOwner::Driver;
        }
    }
}

/// A descriptor the driver is filling with a received frame.
///
/// Dropping the lease without handing it over returns the descriptor to the
/// free list.
pub struct DriverLease {
    pool: Arc<PoolShared>,
    index: usize,
    storage: Option<Box<[u8]>>,
    length: usize,
}

impl DriverLease {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let offset = self.pool.header_offset;
        match &mut self.storage {
            Some(storage) => &mut storage[offset..],
            None => &mut [],
        }
    }

    /// Copy `frame` into the payload. Returns the number of bytes stored.
    pub fn fill(&mut self, frame: &[u8]) -> usize {
        let payload = self.payload_mut();
        let n = frame.len().min(payload.len());
        payload[..n].copy_from_slice(&frame[..n]);
        self.length = n;
        n
    }

    pub fn set_length(&mut self, length: usize) {
        self.length = length.min(self.pool.payload_capacity);
    }

    pub fn payload_addr(&self) -> usize {
        self.pool.slot_base(self.index) + self.pool.header_offset
    }

    /// Keep the descriptor driver-owned and refer to it by payload address
    /// only, the way a zero-copy driver passes frames up the stack.
    #[cfg(feature = "zero-copy")]
    pub fn hand_over(mut self) -> ferrous_ipstack_domain::PayloadAddress {
        let address = self.payload_addr();
        if let Some(storage) = self.storage.take() {
            self.pool.park_with_driver(self.index, storage, self.length);
        }
        ferrous_ipstack_domain::PayloadAddress(address)
    }
}

impl Drop for DriverLease {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.pool.release(self.index, storage);
        }
    }
}

/// Descriptor pool usage snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub total: usize,
    pub free: usize,
    pub driver_owned: usize,
    pub stack_owned: usize,
    pub application_owned: usize,
    /// Fewest free descriptors observed since the pool was built.
    pub low_water_mark: usize,
}

impl PoolStats {
    pub fn in_use(&self) -> usize {
        self.total - self.free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_drop_returns_descriptor() {
        let pool = NetworkBufferPool::new(2, 512);
        assert_eq!(pool.stats().free, 2);

        let buffer = pool.acquire().unwrap();
        assert_eq!(buffer.owner(), BufferOwner::Stack);
        assert_eq!(pool.stats().stack_owned, 1);
        assert_eq!(pool.stats().free, 1);

        drop(buffer);
        assert_eq!(pool.stats().free, 2);
        assert_eq!(pool.stats().low_water_mark, 1);
    }

    #[test]
    fn test_exhausted_pool_returns_none() {
        let pool = NetworkBufferPool::new(1, 512);
        let _held = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        assert!(pool.acquire_for_driver().is_none());
        assert_eq!(pool.stats().low_water_mark, 0);
    }

    #[test]
    fn test_payload_address_is_base_plus_header_offset() {
        let pool = NetworkBufferPool::new(3, 512);
        let mut buffer = pool.acquire().unwrap();
        assert_eq!(
            buffer.payload_addr(),
            buffer.base_addr() + pool.header_offset()
        );
        assert_eq!(buffer.payload_mut().len(), 512);
    }

    #[test]
    fn test_set_length_clamps_to_capacity() {
        let pool = NetworkBufferPool::new(1, 512);
        let mut buffer = pool.acquire().unwrap();
        buffer.set_length(4096);
        assert_eq!(buffer.len(), 512);
    }

    #[test]
    fn test_transfer_to_application_updates_owner() {
        let pool = NetworkBufferPool::new(1, 512);
        let mut buffer = pool.acquire().unwrap();
        buffer.transfer_to_application();
        assert_eq!(buffer.owner(), BufferOwner::Application);
        assert_eq!(pool.stats().application_owned, 1);
    }

    #[test]
    fn test_dropped_driver_lease_is_freed() {
        let pool = NetworkBufferPool::new(1, 512);
        let mut lease = pool.acquire_for_driver().unwrap();
        assert_eq!(lease.fill(b"frame"), 5);
        assert_eq!(pool.stats().driver_owned, 1);

        drop(lease);
        assert_eq!(pool.stats().free, 1);
    }

    #[test]
    fn test_fill_truncates_to_capacity() {
        let pool = NetworkBufferPool::new(1, 512);
        let mut lease = pool.acquire_for_driver().unwrap();
        assert_eq!(lease.fill(&[0xAA; 600]), 512);
    }
}
