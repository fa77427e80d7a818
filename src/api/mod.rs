/*!
 * API Module
 * HTTP collaborator: maps requests onto simulator operations
 */

pub mod handlers;
pub mod server;
pub mod types;

// Re-export for convenience
pub use server::{router, serve, AppState};
pub use types::*;
