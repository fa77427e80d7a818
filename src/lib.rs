/*!
 * Pressure Simulator Library
 *
 * A service core that deliberately grows and shrinks its own memory
 * footprint, watches resident usage against a threshold, and asks its host
 * process to exit after repeated allocation failures.
 */

pub mod api;
pub mod core;
pub mod escalation;
pub mod memory;
pub mod monitoring;
pub mod simulator;

// Re-exports
pub use crate::core::{Config, ConfigError, ThresholdConfig};
pub use escalation::{EscalationAction, EscalationPolicy, EscalationState};
pub use memory::{
    AllocationError, BlockAllocator, DeallocationError, HeapAllocator, Ledger, LedgerSnapshot,
    MemoryBlock,
};
pub use monitoring::{
    evaluate, init_tracing, HealthVerdict, MonitorTask, SystemSampler, UsageSample, UsageSource,
};
pub use simulator::{EscalationReceiver, PressureSimulator, UsageReport};
