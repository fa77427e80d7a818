/*!
 * Usage Sampler
 * Point-in-time reads of this process's memory footprint
 *
 * Sampling never fails: when host introspection is unavailable the sampler
 * returns a degraded sample (zero usage, fresh timestamp, `degraded = true`)
 * so the pressure monitor keeps running.
 */

use crate::core::types::bytes_to_mb;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};
use time::OffsetDateTime;
use tracing::warn;

/// Immutable memory reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    pub resident_mb: f64,
    pub virtual_mb: f64,
    pub percent_of_system: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    #[serde(default)]
    pub degraded: bool,
}

impl UsageSample {
    pub fn new(resident_mb: f64, virtual_mb: f64, percent_of_system: f64) -> Self {
        Self {
            resident_mb: round2(resident_mb),
            virtual_mb: round2(virtual_mb),
            percent_of_system: round2(percent_of_system),
            taken_at: OffsetDateTime::now_utc(),
            degraded: false,
        }
    }

    /// Fallback reading used when introspection fails
    pub fn degraded() -> Self {
        Self {
            resident_mb: 0.0,
            virtual_mb: 0.0,
            percent_of_system: 0.0,
            taken_at: OffsetDateTime::now_utc(),
            degraded: true,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Anything that can report current process memory usage
pub trait UsageSource: Send + Sync {
    fn sample(&self) -> UsageSample;
}

/// Host-backed sampler using `sysinfo`
///
/// Builds a fresh `System` per read so concurrent callers share no state.
#[derive(Debug, Clone)]
pub struct SystemSampler {
    pid: Option<Pid>,
}

impl SystemSampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!(error = e, "Cannot resolve own PID; usage samples will be degraded");
                None
            }
        };
        Self { pid }
    }

    /// Sample an arbitrary process (useful for testing the degraded path)
    pub fn for_pid(pid: u32) -> Self {
        Self {
            pid: Some(Pid::from_u32(pid)),
        }
    }

    fn read(&self) -> Option<UsageSample> {
        let pid = self.pid?;
        let mut system = System::new();
        system.refresh_memory();
        if !system.refresh_process(pid) {
            return None;
        }
        let process = system.process(pid)?;

        let resident = process.memory();
        let total = system.total_memory();
        let percent = if total > 0 {
            resident as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Some(UsageSample::new(
            bytes_to_mb(resident),
            bytes_to_mb(process.virtual_memory()),
            percent,
        ))
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageSource for SystemSampler {
    fn sample(&self) -> UsageSample {
        match self.read() {
            Some(sample) => sample,
            None => {
                warn!(
                    pid = ?self.pid,
                    "Memory introspection unavailable; returning degraded sample"
                );
                UsageSample::degraded()
            }
        }
    }
}
