/*!
 * Server Module
 */

mod http_server;

pub use http_server::{router, serve, AppState};
