//! Recovery of a descriptor from the payload address a zero-copy driver hands
//! back to the stack.
//!
//! The driver only ever sees `base + BUFFER_HEADER_OFFSET`. Going the other
//! way is plain address arithmetic, checked against the pool's table of
//! descriptor bases so a bad pointer is reported instead of dereferenced.

use super::descriptor::{BufferOwner, NetworkBuffer};
use super::pool::NetworkBufferPool;
use ferrous_ipstack_domain::PayloadAddress;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Null payload pointer")]
    NullPointer,

    #[error("Payload pointer {address:#x} is {offset} bytes past descriptor {index}'s base, expected {expected}")]
    Misaligned {
        address: usize,
        index: usize,
        offset: usize,
        expected: usize,
    },

    #[error("Payload pointer {0:#x} does not belong to the buffer pool")]
    OutsidePool(usize),

    #[error("Descriptor {index} is owned by {owner}, not the driver")]
    NotDriverOwned { index: usize, owner: BufferOwner },

    #[error("Descriptor {index} header is corrupt")]
    CorruptHeader { index: usize },
}

/// Map a payload address to the index of the descriptor whose base sits
/// exactly `header_offset` bytes below it.
///
/// `bases` holds `(base address, index)` pairs sorted by address, each
/// descriptor spanning `slot_len` bytes.
pub(super) fn locate_descriptor(
    bases: &[(usize, usize)],
    slot_len: usize,
    header_offset: usize,
    payload: usize,
) -> Result<usize, BridgeError> {
    if payload == 0 {
        return Err(BridgeError::NullPointer);
    }

    // Last descriptor whose base is at or below the payload.
    let pos = bases.partition_point(|(base, _)| *base <= payload);
    if pos == 0 {
        return Err(BridgeError::OutsidePool(payload));
    }

    let (base, index) = bases[pos - 1];
    let offset = payload - base;
    if offset == header_offset {
        Ok(index)
    } else if offset < slot_len {
        Err(BridgeError::Misaligned {
            address: payload,
            index,
            offset,
            expected: header_offset,
        })
    } else {
        Err(BridgeError::OutsidePool(payload))
    }
}

impl NetworkBufferPool {
    /// Turn a driver-supplied payload pointer back into its descriptor,
    /// transferring ownership from the driver to the stack.
    ///
    /// The pointer is never dereferenced; only its address is compared.
    pub fn buffer_from_payload(&self, payload: *const u8) -> Result<NetworkBuffer, BridgeError> {
        self.buffer_from_address(PayloadAddress(payload as usize))
    }

    pub fn buffer_from_address(
        &self,
        address: PayloadAddress,
    ) -> Result<NetworkBuffer, BridgeError> {
        let shared = self.shared();
        let slot_len = shared.header_offset + shared.payload_capacity;
        let index = locate_descriptor(&shared.bases, slot_len, shared.header_offset, address.0)
            .inspect_err(|e| error!(address = %address, error = %e, "Rejected driver payload pointer"))?;

        let (storage, length) = shared
            .claim_from_driver(index)
            .map_err(|owner| BridgeError::NotDriverOwned { index, owner })
            .inspect_err(|e| error!(error = %e, "Rejected driver payload pointer"))?;

        if storage[..4] != (index as u32).to_le_bytes() {
            shared.restore_to_driver(index, storage);
            error!(index, "Descriptor header overwritten by driver");
            return Err(BridgeError::CorruptHeader { index });
        }

        debug!(index, length, "Driver buffer bridged to stack");

        Ok(NetworkBuffer {
            pool: Arc::clone(shared),
            index,
            storage: Some(storage),
            length,
            owner: BufferOwner::Stack,
            source: None,
        })
    }
}
