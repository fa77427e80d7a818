/*!
 * Monitoring
 * Usage sampling, health evaluation, the pressure watchdog, and tracing
 */

pub mod health;
pub mod monitor;
pub mod sampler;
mod tracer;

pub use health::{evaluate, HealthVerdict};
pub use monitor::{MonitorCommand, MonitorStats, MonitorStatsSnapshot, MonitorTask};
pub use sampler::{SystemSampler, UsageSample, UsageSource};
pub use tracer::{generate_trace_id, init_tracing, request_span};
