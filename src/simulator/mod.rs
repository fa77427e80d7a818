/*!
 * Pressure Simulator
 *
 * Owns the shared mutable state (ledger + escalation counter) behind a
 * single lock and exposes the four operations the HTTP layer calls:
 * allocate, deallocate, usage, and health probe.
 *
 * The lock covers bookkeeping only. Filling a new block and freeing removed
 * ones both happen outside it, so the monitor and readers never wait on a
 * large allocation.
 *
 * Escalation actions are not executed here. They are pushed onto an
 * unbounded channel that the hosting process drains; the receiver is handed
 * out once by `PressureSimulator::new`.
 */

use crate::core::config::Config;
use crate::core::types::{BlockCount, Megabytes};
use crate::escalation::{EscalationAction, EscalationPolicy, EscalationState};
use crate::memory::{
    materialize_with, validate_request, AllocationResult, BlockAllocator, DeallocationResult,
    HeapAllocator, Ledger, LedgerSnapshot,
};
use crate::monitoring::health::{evaluate, HealthVerdict};
use crate::monitoring::{SystemSampler, UsageSample, UsageSource};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Receiving end for escalation actions
pub type EscalationReceiver = mpsc::UnboundedReceiver<EscalationAction>;

/// Usage reading paired with the ledger view
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub memory: UsageSample,
    pub allocated_blocks: BlockCount,
    pub allocated_mb: Megabytes,
}

/// Everything guarded by the simulator lock
#[derive(Debug)]
struct SimulatorState {
    ledger: Ledger,
    escalation: EscalationPolicy,
}

pub struct PressureSimulator {
    state: Mutex<SimulatorState>,
    allocator: Arc<dyn BlockAllocator>,
    sampler: Arc<dyn UsageSource>,
    config: Config,
    actions: mpsc::UnboundedSender<EscalationAction>,
}

impl PressureSimulator {
    /// Heap-backed simulator sampling the current process
    pub fn new(config: Config) -> (Self, EscalationReceiver) {
        Self::with_parts(
            config,
            Arc::new(HeapAllocator::new()),
            Arc::new(SystemSampler::new()),
        )
    }

    /// Simulator over custom block and usage sources (useful for testing)
    pub fn with_parts(
        config: Config,
        allocator: Arc<dyn BlockAllocator>,
        sampler: Arc<dyn UsageSource>,
    ) -> (Self, EscalationReceiver) {
        let (actions, receiver) = mpsc::unbounded_channel();
        let state = SimulatorState {
            ledger: Ledger::with_allocator(config.max_allocation_mb, Arc::clone(&allocator)),
            escalation: EscalationPolicy::new(config.threshold.max_consecutive_failures),
        };

        let simulator = Self {
            state: Mutex::new(state),
            allocator,
            sampler,
            config,
            actions,
        };
        (simulator, receiver)
    }

    /// Grow the ledger; feeds the consecutive-failure counter
    ///
    /// Blocks the calling thread for as long as the fill takes. Async callers
    /// should run it on the blocking pool.
    pub fn allocate(&self, size_mb: Megabytes) -> AllocationResult<LedgerSnapshot> {
        validate_request(size_mb, self.config.max_allocation_mb)?;
        let materialized = materialize_with(self.allocator.as_ref(), size_mb);

        let (result, action) = {
            let mut state = self.state.lock();
            match materialized {
                Ok(block) => {
                    state.ledger.commit(block);
                    state.escalation.record_success();
                    (Ok(state.ledger.snapshot()), None)
                }
                Err(e) if e.is_host_failure() => {
                    let action = state.escalation.record_failure();
                    (Err(e), action)
                }
                Err(e) => (Err(e), None),
            }
        };

        if let Some(action) = action {
            self.dispatch(action);
        }
        result
    }

    /// Shrink the ledger, most recent blocks first
    pub fn deallocate(&self, size_mb: Megabytes) -> DeallocationResult<LedgerSnapshot> {
        let (released, snapshot) = {
            let mut state = self.state.lock();
            let released = state.ledger.release(size_mb)?;
            (released, state.ledger.snapshot())
        };

        // buffers go back to the allocator with the lock already released
        drop(released);
        Ok(snapshot)
    }

    /// Current usage plus ledger view
    pub fn usage(&self) -> UsageReport {
        let memory = self.sampler.sample();
        let snapshot = self.snapshot();
        UsageReport {
            memory,
            allocated_blocks: snapshot.blocks,
            allocated_mb: snapshot.total_mb,
        }
    }

    /// Synchronous probe path; no escalation side effects
    pub fn health_probe(&self) -> HealthVerdict {
        let sample = self.sampler.sample();
        evaluate(&sample, &self.config.threshold)
    }

    /// One monitor iteration: sample, evaluate, escalate on breach
    ///
    /// The sample is taken without the lock; the lock is held only while the
    /// policy records the breach.
    pub fn monitor_cycle(&self) -> HealthVerdict {
        let sample = self.sampler.sample();
        let verdict = evaluate(&sample, &self.config.threshold);

        if let HealthVerdict::Unhealthy { sample, .. } = &verdict {
            let action = self.state.lock().escalation.on_sustained_pressure(sample);
            if let Some(action) = action {
                self.dispatch(action);
            }
        } else {
            debug!(resident_mb = sample.resident_mb, "Monitor sample healthy");
        }

        verdict
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.lock().ledger.snapshot()
    }

    #[inline]
    pub fn block_count(&self) -> BlockCount {
        self.state.lock().ledger.block_count()
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.state.lock().escalation.state()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().escalation.consecutive_failures()
    }

    pub fn pressure_events(&self) -> u64 {
        self.state.lock().escalation.pressure_events()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn dispatch(&self, action: EscalationAction) {
        if self.actions.send(action).is_err() {
            error!(?action, "Escalation receiver dropped; action not delivered");
        }
    }
}

impl std::fmt::Debug for PressureSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressureSimulator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
