/*!
 * Escalation Types
 */

use serde::{Deserialize, Serialize};

/// Escalation state machine
///
/// `Terminated` is absorbing: once entered, no later event leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EscalationState {
    Nominal,
    Degraded { consecutive_failures: u32 },
    Terminated { consecutive_failures: u32 },
}

impl EscalationState {
    #[inline]
    pub fn is_terminated(&self) -> bool {
        matches!(self, EscalationState::Terminated { .. })
    }
}

impl std::fmt::Display for EscalationState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EscalationState::Nominal => write!(f, "NOMINAL"),
            EscalationState::Degraded { consecutive_failures } => {
                write!(f, "DEGRADED ({} consecutive failures)", consecutive_failures)
            }
            EscalationState::Terminated { consecutive_failures } => {
                write!(f, "TERMINATED ({} consecutive failures)", consecutive_failures)
            }
        }
    }
}

/// Action the hosting process must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EscalationAction {
    /// Exit so the orchestrator restarts a clean instance
    TerminateProcess { consecutive_failures: u32 },
}
