/*!
 * Escalation Module
 * Decides when pressure turns into self-termination
 */

mod policy;
mod types;

pub use policy::EscalationPolicy;
pub use types::{EscalationAction, EscalationState};
