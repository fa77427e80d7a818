/*!
 * System Limits and Constants
 *
 * Centralized location for defaults, thresholds, and magic numbers.
 * Every value here can be overridden from the environment at startup
 * (see `core::config`) unless noted otherwise.
 */

use std::time::Duration;

// =============================================================================
// ALLOCATION LIMITS
// =============================================================================

/// Largest single allocation accepted per call (800MB)
/// Keeps one request from exhausting the host outright
pub const DEFAULT_MAX_ALLOCATION_MB: u64 = 800;

/// Size used by the HTTP layer when a request omits `mb`
pub const DEFAULT_REQUEST_MB: u64 = 10;

/// Byte pattern written into every materialized block
/// Non-zero so the kernel cannot back the pages with the shared zero page
pub const BLOCK_FILL_BYTE: u8 = 0xA5;

// =============================================================================
// HEALTH AND MONITORING
// =============================================================================

/// Resident-size threshold above which the service reports unhealthy (230MB)
pub const DEFAULT_THRESHOLD_MB: f64 = 230.0;

/// Pressure monitor sampling interval
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(5_000);

// =============================================================================
// ESCALATION
// =============================================================================

/// Consecutive failed allocations before the process terminates itself
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Exit code used when the escalation policy terminates the process
/// Distinct from 1 (startup error) so orchestrator logs tell the two apart
pub const TERMINATION_EXIT_CODE: i32 = 3;

// =============================================================================
// NETWORK
// =============================================================================

/// HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
