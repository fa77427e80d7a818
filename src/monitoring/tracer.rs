/*!
 * Structured Tracing
 * Subscriber setup and request correlation using the tracing crate
 *
 * Features:
 * - Environment-driven log level (RUST_LOG, default: info)
 * - JSON-formatted logs for structured parsing (PRESSURE_TRACE_JSON)
 * - Trace IDs on every HTTP request span
 */

use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Must be called once, before any other subsystem starts logging.
pub fn init_tracing(use_json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one HTTP request
pub fn request_span(method: &str, path: &str) -> Span {
    span!(
        Level::INFO,
        "request",
        trace_id = %generate_trace_id(),
        method = method,
        path = path,
    )
}
