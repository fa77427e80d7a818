/*!
 * Memory Types
 * Blocks, ledger snapshots, and ledger errors
 */

use crate::core::types::{BlockCount, Megabytes};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allocation result
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Deallocation result
pub type DeallocationResult<T> = Result<T, DeallocationError>;

/// Allocation errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum AllocationError {
    #[error("Refusing to allocate {requested} MB (max {cap} MB per request)")]
    #[diagnostic(
        code(ledger::request_too_large),
        help("Split the request into several smaller allocations.")
    )]
    RequestTooLarge { requested: Megabytes, cap: Megabytes },

    #[error("Failed to allocate {requested} MB (system out of memory?): {reason}")]
    #[diagnostic(
        code(ledger::allocation_failed),
        help("The host could not satisfy the request. Repeated failures terminate the process.")
    )]
    AllocationFailed { requested: Megabytes, reason: String },

    #[error("Allocation size must be at least 1 MB")]
    #[diagnostic(code(ledger::invalid_size))]
    InvalidSize,
}

impl AllocationError {
    /// Stable snake_case identifier for wire responses
    pub fn code(&self) -> &'static str {
        match self {
            AllocationError::RequestTooLarge { .. } => "request_too_large",
            AllocationError::AllocationFailed { .. } => "allocation_failed",
            AllocationError::InvalidSize => "invalid_size",
        }
    }

    /// Whether this error counts toward the consecutive-failure escalation
    #[inline]
    pub fn is_host_failure(&self) -> bool {
        matches!(self, AllocationError::AllocationFailed { .. })
    }
}

/// Deallocation errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum DeallocationError {
    #[error("No allocated memory to deallocate")]
    #[diagnostic(code(ledger::nothing_allocated))]
    NothingAllocated,

    #[error("Deallocation size must be at least 1 MB")]
    #[diagnostic(code(ledger::invalid_size))]
    InvalidSize,
}

impl DeallocationError {
    pub fn code(&self) -> &'static str {
        match self {
            DeallocationError::NothingAllocated => "nothing_allocated",
            DeallocationError::InvalidSize => "invalid_size",
        }
    }
}

/// One discrete unit of simulated allocation
///
/// Owns its buffer; dropping the block returns the memory to the allocator.
pub struct MemoryBlock {
    size_mb: Megabytes,
    payload: Box<[u8]>,
}

impl MemoryBlock {
    pub fn new(size_mb: Megabytes, payload: Box<[u8]>) -> Self {
        Self { size_mb, payload }
    }

    /// Estimated size in MB
    #[inline]
    pub fn size_mb(&self) -> Megabytes {
        self.size_mb
    }

    /// MB credited when this block is removed (a block always frees at least 1 MB)
    #[inline]
    pub fn freed_mb(&self) -> Megabytes {
        self.size_mb.max(1)
    }

    /// Bytes actually held by the payload
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

impl std::fmt::Debug for MemoryBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("size_mb", &self.size_mb)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Consistent view of the ledger taken under its lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub blocks: BlockCount,
    pub total_mb: Megabytes,
}
