/*!
 * Memory Module
 * Allocation ledger and block materialization
 */

pub mod heap;
pub mod ledger;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use heap::HeapAllocator;
pub use ledger::{materialize_with, validate_request, Ledger};
pub use traits::*;
pub use types::*;
