/*!
 * Escalation Tests
 * Failure counting, termination, and the soft pressure path end to end
 */

use crate::common::harness;
use pressure_sim::{EscalationAction, EscalationState};
use pretty_assertions::assert_eq;

#[test]
fn test_five_failures_terminate_once() {
    let mut h = harness(230.0, 5, 800);
    h.allocator.set_failing(true);

    let mut actions = Vec::new();
    for _ in 0..7 {
        assert!(h.simulator.allocate(10).is_err());
        while let Ok(action) = h.escalations.try_recv() {
            actions.push((h.simulator.consecutive_failures(), action));
        }
    }

    assert_eq!(
        actions,
        vec![(
            5,
            EscalationAction::TerminateProcess {
                consecutive_failures: 5
            }
        )]
    );
    assert_eq!(
        h.simulator.escalation_state(),
        EscalationState::Terminated {
            consecutive_failures: 5
        }
    );
}

#[test]
fn test_success_between_failures_resets() {
    let mut h = harness(230.0, 3, 800);

    h.allocator.set_failing(true);
    h.simulator.allocate(10).unwrap_err();
    h.simulator.allocate(10).unwrap_err();
    assert_eq!(h.simulator.consecutive_failures(), 2);

    h.allocator.set_failing(false);
    h.simulator.allocate(10).unwrap();
    assert_eq!(h.simulator.consecutive_failures(), 0);
    assert_eq!(h.simulator.escalation_state(), EscalationState::Nominal);

    h.allocator.set_failing(true);
    h.simulator.allocate(10).unwrap_err();
    h.simulator.allocate(10).unwrap_err();
    assert!(h.escalations.try_recv().is_err());
    assert!(!h.simulator.escalation_state().is_terminated());
}

#[test]
fn test_rejected_requests_do_not_count() {
    let mut h = harness(230.0, 1, 800);
    for _ in 0..10 {
        h.simulator.allocate(801).unwrap_err();
        h.simulator.allocate(0).unwrap_err();
    }
    assert_eq!(h.simulator.consecutive_failures(), 0);
    assert!(h.escalations.try_recv().is_err());
}

#[test]
fn test_sustained_pressure_only_degrades_probe() {
    let mut h = harness(230.0, 5, 800);
    h.source.set(400);

    for _ in 0..20 {
        assert!(!h.simulator.monitor_cycle().is_healthy());
    }

    assert_eq!(h.simulator.pressure_events(), 20);
    assert!(h.escalations.try_recv().is_err());
    assert_eq!(h.simulator.escalation_state(), EscalationState::Nominal);
    assert!(!h.simulator.health_probe().is_healthy());
}
