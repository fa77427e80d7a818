/*!
 * Heap Allocator
 * Materializes blocks on the process heap and touches every page
 */

use super::traits::BlockAllocator;
use super::types::{AllocationError, AllocationResult, MemoryBlock};
use crate::core::limits::BLOCK_FILL_BYTE;
use crate::core::types::{Megabytes, BYTES_PER_MB};
use tracing::debug;

/// Default allocator backed by `Vec::try_reserve_exact`
///
/// Reservation failures surface as `AllocationFailed` instead of aborting.
/// The buffer is filled with a non-zero byte so its pages become resident.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl HeapAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl BlockAllocator for HeapAllocator {
    fn materialize(&self, size_mb: Megabytes) -> AllocationResult<MemoryBlock> {
        let len = size_mb
            .checked_mul(BYTES_PER_MB)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(|| AllocationError::AllocationFailed {
                requested: size_mb,
                reason: "size exceeds addressable memory".to_string(),
            })?;

        let mut buffer: Vec<u8> = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|e| AllocationError::AllocationFailed {
                requested: size_mb,
                reason: e.to_string(),
            })?;
        buffer.resize(len, BLOCK_FILL_BYTE);

        debug!(size_mb, bytes = len, "Materialized heap block");
        Ok(MemoryBlock::new(size_mb, buffer.into_boxed_slice()))
    }
}
