/*!
 * Pressure Monitor - Background Self-Protection Watchdog
 *
 * One long-lived task that samples usage on a fixed interval, evaluates it
 * against the threshold, and hands breaches to the escalation policy. It
 * never stops on its own and keeps running through degraded samples.
 *
 * # Graceful-with-Fallback Shutdown
 *
 * 1. **Preferred:** `shutdown().await` sends `Shutdown`, awaits the task,
 *    and consumes the handle.
 * 2. **Fallback:** dropping the handle without `shutdown()` aborts the task
 *    through `JoinHandle::abort()` and logs a warning.
 *
 * The shutdown request is examined once per iteration. Each cycle samples
 * and takes the simulator lock on the blocking pool, so a slow `/proc` read
 * never stalls an async worker.
 *
 * # Example Usage
 *
 * ```no_run
 * # use std::sync::Arc;
 * # use std::time::Duration;
 * # use pressure_sim::{Config, MonitorTask, PressureSimulator};
 * # async fn example() {
 * let (simulator, _actions) = PressureSimulator::new(Config::default());
 * let task = MonitorTask::spawn(Arc::new(simulator), Duration::from_secs(5));
 *
 * // ... serve requests ...
 *
 * task.shutdown().await;
 * # }
 * ```
 */

use crate::simulator::PressureSimulator;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

/// Control messages for the monitor task
#[derive(Debug, Clone)]
pub enum MonitorCommand {
    /// Run one sample-evaluate cycle immediately
    Trigger,
    /// Stop the monitor loop
    Shutdown,
}

/// Lock-free counters describing monitor activity
#[derive(Debug, Default)]
pub struct MonitorStats {
    cycles: AtomicU64,
    unhealthy_cycles: AtomicU64,
    degraded_samples: AtomicU64,
}

/// Point-in-time copy of `MonitorStats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorStatsSnapshot {
    pub cycles: u64,
    pub unhealthy_cycles: u64,
    pub degraded_samples: u64,
}

impl MonitorStats {
    pub fn snapshot(&self) -> MonitorStatsSnapshot {
        MonitorStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            unhealthy_cycles: self.unhealthy_cycles.load(Ordering::Relaxed),
            degraded_samples: self.degraded_samples.load(Ordering::Relaxed),
        }
    }
}

/// Handle to the monitor background task
pub struct MonitorTask {
    command_tx: mpsc::UnboundedSender<MonitorCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_initiated: Arc<AtomicBool>,
    stats: Arc<MonitorStats>,
}

impl MonitorTask {
    /// Spawn the monitor; the first cycle runs immediately
    pub fn spawn(simulator: Arc<PressureSimulator>, interval: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(MonitorStats::default());

        let loop_stats = Arc::clone(&stats);
        let handle = tokio::spawn(async move {
            run_monitor_loop(simulator, interval, loop_stats, command_rx).await;
        });

        info!(interval_ms = interval.as_millis() as u64, "Pressure monitor spawned");

        Self {
            command_tx,
            handle: Some(handle),
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
            stats,
        }
    }

    /// Request an immediate cycle
    pub fn trigger(&self) {
        let _ = self.command_tx.send(MonitorCommand::Trigger);
    }

    pub fn stats(&self) -> MonitorStatsSnapshot {
        self.stats.snapshot()
    }

    /// Shared counters, for readers that outlive the handle
    pub fn stats_handle(&self) -> Arc<MonitorStats> {
        Arc::clone(&self.stats)
    }

    /// Stop the monitor and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.shutdown_initiated.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(MonitorCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Pressure monitor shutdown error");
            } else {
                info!("Pressure monitor shutdown complete");
            }
        }
    }
}

async fn run_monitor_loop(
    simulator: Arc<PressureSimulator>,
    period: Duration,
    stats: Arc<MonitorStats>,
    mut command_rx: mpsc::UnboundedReceiver<MonitorCommand>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(
        interval_ms = period.as_millis() as u64,
        threshold_mb = simulator.config().threshold.threshold_mb,
        "Pressure monitor loop started"
    );

    loop {
        tokio::select! {
            biased;

            cmd = command_rx.recv() => {
                match cmd {
                    Some(MonitorCommand::Trigger) => {
                        trace!("Manual monitor trigger");
                        run_cycle(&simulator, &stats).await;
                    }
                    Some(MonitorCommand::Shutdown) | None => {
                        info!("Pressure monitor shutting down");
                        break;
                    }
                }
            }

            _ = interval.tick() => {
                run_cycle(&simulator, &stats).await;
            }
        }
    }
}

async fn run_cycle(simulator: &Arc<PressureSimulator>, stats: &MonitorStats) {
    let simulator = Arc::clone(simulator);
    let verdict = match tokio::task::spawn_blocking(move || simulator.monitor_cycle()).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(error = %e, "Monitor cycle task failed");
            return;
        }
    };
    stats.cycles.fetch_add(1, Ordering::Relaxed);

    if verdict.sample().degraded {
        let degraded = stats.degraded_samples.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(degraded_samples = degraded, "Monitor received degraded usage sample");
    }

    if !verdict.is_healthy() {
        stats.unhealthy_cycles.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for MonitorTask {
    fn drop(&mut self) {
        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.handle.take() {
            warn!(
                "MonitorTask dropped without calling shutdown() - aborting task immediately. \
                 Use `task.shutdown().await` for graceful cleanup."
            );
            handle.abort();
        }
    }
}
