/*!
 * Allocation Ledger
 *
 * Ordered record of materialized blocks. Insertion order is recency, so
 * deallocation walks from the back (LIFO).
 *
 * Accounting is block-granular rather than byte-exact: removing a block
 * credits `max(1, size_mb)` against the requested amount, and a request is
 * satisfied once the credited total reaches it. A block is never split.
 *
 * The ledger itself is not synchronized; `PressureSimulator` owns it behind
 * the same lock as the escalation counter. Callers sharing a ledger split
 * growth in two: `validate_request` and `BlockAllocator::materialize` run
 * without the lock, then `commit` records the block under it. Shrinking
 * works the same way in reverse: `release` hands the removed blocks back so
 * their buffers are freed after the lock is dropped.
 */

use super::heap::HeapAllocator;
use super::traits::BlockAllocator;
use super::types::{
    AllocationError, AllocationResult, DeallocationError, DeallocationResult, LedgerSnapshot,
    MemoryBlock,
};
use crate::core::limits::DEFAULT_MAX_ALLOCATION_MB;
use crate::core::types::{BlockCount, Megabytes};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Size checks that must pass before any memory is touched
///
/// Depends only on the request and the immutable cap, so it never needs the
/// ledger lock.
pub fn validate_request(size_mb: Megabytes, max_allocation_mb: Megabytes) -> AllocationResult<()> {
    if size_mb == 0 {
        return Err(AllocationError::InvalidSize);
    }

    if size_mb > max_allocation_mb {
        warn!(
            requested_mb = size_mb,
            cap_mb = max_allocation_mb,
            "Rejected oversized allocation request"
        );
        return Err(AllocationError::RequestTooLarge {
            requested: size_mb,
            cap: max_allocation_mb,
        });
    }

    Ok(())
}

pub struct Ledger {
    blocks: Vec<MemoryBlock>,
    total_mb: Megabytes,
    max_allocation_mb: Megabytes,
    allocator: Arc<dyn BlockAllocator>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_MAX_ALLOCATION_MB)
    }

    /// Create a heap-backed ledger with a custom per-call cap
    pub fn with_cap(max_allocation_mb: Megabytes) -> Self {
        Self::with_allocator(max_allocation_mb, Arc::new(HeapAllocator::new()))
    }

    /// Create a ledger over an arbitrary block source (useful for testing)
    pub fn with_allocator(
        max_allocation_mb: Megabytes,
        allocator: Arc<dyn BlockAllocator>,
    ) -> Self {
        info!(max_allocation_mb, "Allocation ledger initialized");
        Self {
            blocks: Vec::new(),
            total_mb: 0,
            max_allocation_mb,
            allocator,
        }
    }

    /// Grow the ledger by one block of `size_mb`
    ///
    /// Size validation happens before the allocator is touched. On any error
    /// the ledger is left exactly as it was.
    pub fn allocate(&mut self, size_mb: Megabytes) -> AllocationResult<BlockCount> {
        validate_request(size_mb, self.max_allocation_mb)?;
        let block = self.materialize(size_mb)?;
        Ok(self.commit(block))
    }

    /// Build a block through this ledger's allocator without recording it
    pub fn materialize(&self, size_mb: Megabytes) -> AllocationResult<MemoryBlock> {
        materialize_with(self.allocator.as_ref(), size_mb)
    }

    /// Append an already materialized block; returns the new block count
    pub fn commit(&mut self, block: MemoryBlock) -> BlockCount {
        let size_mb = block.size_mb();
        self.total_mb = self.total_mb.saturating_add(size_mb);
        self.blocks.push(block);

        info!(
            size_mb,
            blocks = self.blocks.len(),
            total_mb = self.total_mb,
            "Allocated block"
        );
        self.blocks.len()
    }

    /// Shrink the ledger by roughly `size_mb`, most recent blocks first
    pub fn deallocate(&mut self, size_mb: Megabytes) -> DeallocationResult<BlockCount> {
        self.release(size_mb)?;
        Ok(self.blocks.len())
    }

    /// Detach blocks covering `size_mb`, newest first, and return them
    ///
    /// The caller decides where the buffers are dropped.
    pub fn release(&mut self, size_mb: Megabytes) -> DeallocationResult<Vec<MemoryBlock>> {
        if size_mb == 0 {
            return Err(DeallocationError::InvalidSize);
        }

        if self.blocks.is_empty() {
            warn!(requested_mb = size_mb, "Deallocation requested on empty ledger");
            return Err(DeallocationError::NothingAllocated);
        }

        let mut outstanding = size_mb;
        let mut released = Vec::new();
        let mut freed_mb: Megabytes = 0;

        while outstanding > 0 {
            let Some(block) = self.blocks.pop() else {
                break;
            };
            outstanding = outstanding.saturating_sub(block.freed_mb());
            self.total_mb = self.total_mb.saturating_sub(block.size_mb());
            freed_mb += block.size_mb();
            released.push(block);
        }

        info!(
            requested_mb = size_mb,
            removed = released.len(),
            freed_mb,
            blocks = self.blocks.len(),
            total_mb = self.total_mb,
            "Deallocated blocks"
        );
        Ok(released)
    }

    #[inline]
    pub fn block_count(&self) -> BlockCount {
        self.blocks.len()
    }

    /// Sum of estimated block sizes
    #[inline]
    pub fn total_mb(&self) -> Megabytes {
        self.total_mb
    }

    #[inline]
    pub fn max_allocation_mb(&self) -> Megabytes {
        self.max_allocation_mb
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            blocks: self.blocks.len(),
            total_mb: self.total_mb,
        }
    }

    /// Block sizes from oldest to newest (diagnostic only)
    pub fn block_sizes(&self) -> Vec<Megabytes> {
        self.blocks.iter().map(MemoryBlock::size_mb).collect()
    }
}

/// Run one allocator call, logging failures
pub fn materialize_with(
    allocator: &dyn BlockAllocator,
    size_mb: Megabytes,
) -> AllocationResult<MemoryBlock> {
    allocator.materialize(size_mb).map_err(|e| {
        error!(requested_mb = size_mb, error = %e, "Block materialization failed");
        e
    })
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("blocks", &self.blocks.len())
            .field("total_mb", &self.total_mb)
            .field("max_allocation_mb", &self.max_allocation_mb)
            .finish()
    }
}
