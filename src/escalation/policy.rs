/*!
 * Escalation Policy
 *
 * Two triggers, one terminal action:
 *
 * - **Allocation failures** (hard path): each host-level failure bumps the
 *   consecutive counter, each success resets it. Reaching the cap moves the
 *   policy to `Terminated` and yields `TerminateProcess` exactly once.
 * - **Sustained pressure** (soft path): over-threshold samples from the
 *   monitor are recorded and logged but never terminate the process. They
 *   surface through the health probe so an external liveness check decides.
 */

use super::types::{EscalationAction, EscalationState};
use crate::monitoring::UsageSample;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    state: EscalationState,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
    pressure_events: u64,
    last_pressure: Option<UsageSample>,
}

impl EscalationPolicy {
    /// `max_consecutive_failures` of 0 is treated as 1
    pub fn new(max_consecutive_failures: u32) -> Self {
        Self {
            state: EscalationState::Nominal,
            consecutive_failures: 0,
            max_consecutive_failures: max_consecutive_failures.max(1),
            pressure_events: 0,
            last_pressure: None,
        }
    }

    /// Record a host-level allocation failure
    pub fn record_failure(&mut self) -> Option<EscalationAction> {
        if self.state.is_terminated() {
            return None;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let failures = self.consecutive_failures;

        if failures >= self.max_consecutive_failures {
            self.state = EscalationState::Terminated {
                consecutive_failures: failures,
            };
            error!(
                consecutive_failures = failures,
                max = self.max_consecutive_failures,
                "Allocation failure cap reached; requesting process termination"
            );
            return Some(EscalationAction::TerminateProcess {
                consecutive_failures: failures,
            });
        }

        self.state = EscalationState::Degraded {
            consecutive_failures: failures,
        };
        warn!(
            consecutive_failures = failures,
            max = self.max_consecutive_failures,
            "Allocation failed; escalation degraded"
        );
        None
    }

    /// Record a successful allocation
    pub fn record_success(&mut self) {
        if self.state.is_terminated() {
            return;
        }

        if self.consecutive_failures > 0 {
            info!(
                previous_failures = self.consecutive_failures,
                "Allocation succeeded; escalation back to nominal"
            );
        }
        self.consecutive_failures = 0;
        self.state = EscalationState::Nominal;
    }

    /// Record an over-threshold sample from the monitor (always `None`)
    pub fn on_sustained_pressure(&mut self, sample: &UsageSample) -> Option<EscalationAction> {
        if self.state.is_terminated() {
            return None;
        }

        self.pressure_events += 1;
        warn!(
            resident_mb = sample.resident_mb,
            pressure_events = self.pressure_events,
            "Sustained memory pressure; reporting unhealthy"
        );
        self.last_pressure = Some(sample.clone());
        None
    }

    #[inline]
    pub fn state(&self) -> EscalationState {
        self.state
    }

    #[inline]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    #[inline]
    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures
    }

    #[inline]
    pub fn pressure_events(&self) -> u64 {
        self.pressure_events
    }

    pub fn last_pressure(&self) -> Option<&UsageSample> {
        self.last_pressure.as_ref()
    }
}
