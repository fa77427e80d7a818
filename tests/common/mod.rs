/*!
 * Shared test fixtures
 */

#![allow(dead_code)]

use pressure_sim::{
    AllocationError, BlockAllocator, Config, EscalationReceiver, MemoryBlock, PressureSimulator,
    ThresholdConfig, UsageSample, UsageSource,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

/// Upper bound on how long a gated allocation stays parked
pub const GATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Block source that holds no real memory and can be told to fail
#[derive(Default)]
pub struct ScriptedAllocator {
    fail: AtomicBool,
}

impl ScriptedAllocator {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl BlockAllocator for ScriptedAllocator {
    fn materialize(&self, size_mb: u64) -> Result<MemoryBlock, AllocationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AllocationError::AllocationFailed {
                requested: size_mb,
                reason: "scripted out of memory".to_string(),
            });
        }
        Ok(MemoryBlock::new(size_mb, Vec::new().into_boxed_slice()))
    }
}

/// Block source that parks inside `materialize` until its gate opens
///
/// Stands in for a large buffer fill that takes a long time.
pub struct GatedAllocator {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Test-side controls for a `GatedAllocator`
pub struct Gate {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl Gate {
    /// Block until an allocation is parked inside the allocator
    pub fn wait_entered(&self) {
        self.entered
            .recv_timeout(GATE_TIMEOUT)
            .expect("allocation never reached the allocator");
    }

    /// Let one parked allocation finish
    pub fn open(&self) {
        let _ = self.release.send(());
    }
}

pub fn gated_allocator() -> (Arc<GatedAllocator>, Gate) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let allocator = GatedAllocator {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let gate = Gate {
        entered: entered_rx,
        release: release_tx,
    };
    (Arc::new(allocator), gate)
}

impl BlockAllocator for GatedAllocator {
    fn materialize(&self, size_mb: u64) -> Result<MemoryBlock, AllocationError> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv_timeout(GATE_TIMEOUT);
        Ok(MemoryBlock::new(size_mb, Vec::new().into_boxed_slice()))
    }
}

/// Usage source reporting an adjustable resident size
pub struct SettableSource {
    resident_mb: AtomicU64,
}

impl SettableSource {
    pub fn new(resident_mb: u64) -> Self {
        Self {
            resident_mb: AtomicU64::new(resident_mb),
        }
    }

    pub fn set(&self, resident_mb: u64) {
        self.resident_mb.store(resident_mb, Ordering::SeqCst);
    }
}

impl UsageSource for SettableSource {
    fn sample(&self) -> UsageSample {
        let resident = self.resident_mb.load(Ordering::SeqCst) as f64;
        UsageSample::new(resident, resident * 4.0, 2.5)
    }
}

pub struct Harness {
    pub simulator: Arc<PressureSimulator>,
    pub escalations: EscalationReceiver,
    pub allocator: Arc<ScriptedAllocator>,
    pub source: Arc<SettableSource>,
}

pub fn harness(threshold_mb: f64, max_failures: u32, cap_mb: u64) -> Harness {
    let threshold = ThresholdConfig::new(threshold_mb).with_max_consecutive_failures(max_failures);
    let config = Config::default()
        .with_threshold(threshold)
        .with_max_allocation_mb(cap_mb);
    let allocator = Arc::new(ScriptedAllocator::default());
    let source = Arc::new(SettableSource::new(100));
    let (simulator, escalations) =
        PressureSimulator::with_parts(config, allocator.clone(), source.clone());

    Harness {
        simulator: Arc::new(simulator),
        escalations,
        allocator,
        source,
    }
}

/// Simulator whose allocations park until the test opens the gate
pub struct GatedHarness {
    pub simulator: Arc<PressureSimulator>,
    pub escalations: EscalationReceiver,
    pub source: Arc<SettableSource>,
    pub gate: Gate,
}

pub fn gated_harness(threshold_mb: f64) -> GatedHarness {
    let config = Config::default().with_threshold(ThresholdConfig::new(threshold_mb));
    let (allocator, gate) = gated_allocator();
    let source = Arc::new(SettableSource::new(100));
    let (simulator, escalations) = PressureSimulator::with_parts(config, allocator, source.clone());

    GatedHarness {
        simulator: Arc::new(simulator),
        escalations,
        source,
        gate,
    }
}
