/*!
 * Core Types
 * Common types used across the simulator
 */

/// Size in whole megabytes, as requested by callers
pub type Megabytes = u64;

/// Number of live blocks in the ledger
pub type BlockCount = usize;

/// Bytes per megabyte (binary)
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Convert a byte count to fractional megabytes
#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB as f64
}
