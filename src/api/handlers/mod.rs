/*!
 * HTTP Handlers
 */

mod health_handlers;
mod memory_handlers;

pub use health_handlers::handle_health;
pub use memory_handlers::{handle_allocate, handle_deallocate, handle_index, handle_memory};
