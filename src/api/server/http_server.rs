/*!
 * HTTP Server
 * Route table, shared state, and the serve loop
 */

use crate::api::handlers::{
    handle_allocate, handle_deallocate, handle_health, handle_index, handle_memory,
};
use crate::monitoring::request_span;
use crate::simulator::PressureSimulator;
use axum::extract::Request;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<PressureSimulator>,
    pub hostname: Arc<str>,
}

impl AppState {
    pub fn new(simulator: Arc<PressureSimulator>) -> Self {
        let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
        Self::with_hostname(simulator, hostname)
    }

    pub fn with_hostname(simulator: Arc<PressureSimulator>, hostname: impl Into<Arc<str>>) -> Self {
        Self {
            simulator,
            hostname: hostname.into(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/memory", get(handle_memory))
        .route("/allocate", post(handle_allocate))
        .route("/deallocate", post(handle_deallocate))
        .route("/health", get(handle_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            request_span(req.method().as_str(), req.uri().path())
        }))
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
