/*!
 * Memory Traits
 * Block materialization abstraction
 */

use super::types::{AllocationResult, MemoryBlock};
use crate::core::types::Megabytes;

/// Source of materialized memory blocks
///
/// Implementations must leave no partial state behind on failure.
/// The only error they return is `AllocationError::AllocationFailed`.
pub trait BlockAllocator: Send + Sync {
    fn materialize(&self, size_mb: Megabytes) -> AllocationResult<MemoryBlock>;
}
