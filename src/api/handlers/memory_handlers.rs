/*!
 * Memory-related HTTP handler implementations
 */

use crate::api::server::AppState;
use crate::api::types::{AllocateResponse, ApiError, DeallocateResponse, MemoryResponse, SizeQuery};
use axum::extract::{Query, State};
use axum::response::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Index document version, kept stable across crate releases
const INDEX_VERSION: &str = "1.0";

/// `GET /` - service info and current usage
#[instrument(skip_all)]
pub async fn handle_index(State(state): State<AppState>) -> Json<Value> {
    let usage = state.simulator.usage();

    Json(json!({
        "app": "Memory Resource Limiter",
        "version": INDEX_VERSION,
        "purpose": "Test orchestrator resource limits and container throttling",
        "hostname": state.hostname,
        "memory_usage": usage.memory,
        "allocated_blocks": usage.allocated_blocks,
        "allocated_mb": usage.allocated_mb,
        "max_allocation_mb": state.simulator.config().max_allocation_mb,
        "threshold_mb": state.simulator.config().threshold.threshold_mb,
        "endpoints": {
            "GET /": "This info",
            "GET /memory": "Show memory usage",
            "POST /allocate?mb=100": "Allocate 100 MB",
            "POST /deallocate?mb=100": "Deallocate 100 MB",
            "GET /health": "Health check",
        },
    }))
}

/// `GET /memory`
#[instrument(skip_all)]
pub async fn handle_memory(State(state): State<AppState>) -> Json<MemoryResponse> {
    let usage = state.simulator.usage();
    Json(MemoryResponse {
        memory: usage.memory,
        allocated_blocks: usage.allocated_blocks,
        allocated_mb: usage.allocated_mb,
    })
}

/// `POST /allocate?mb=N`
///
/// The fill runs on the blocking pool so async workers keep serving.
#[instrument(skip_all, fields(mb = ?query.mb))]
pub async fn handle_allocate(
    State(state): State<AppState>,
    Query(query): Query<SizeQuery>,
) -> Result<Json<AllocateResponse>, ApiError> {
    let request_mb = query.mb()?;

    let simulator = Arc::clone(&state.simulator);
    let snapshot = tokio::task::spawn_blocking(move || simulator.allocate(request_mb))
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("Allocation task failed: {}", e),
            request_mb,
        })?
        .map_err(|error| ApiError::Allocation { error, request_mb })?;

    info!(request_mb, blocks = snapshot.blocks, "HTTP: allocation accepted");

    Ok(Json(AllocateResponse {
        status: "success".to_string(),
        allocated_mb: request_mb,
        memory: state.simulator.usage().memory,
        allocated_blocks: snapshot.blocks,
        ledger_mb: snapshot.total_mb,
    }))
}

/// `POST /deallocate?mb=N`
#[instrument(skip_all, fields(mb = ?query.mb))]
pub async fn handle_deallocate(
    State(state): State<AppState>,
    Query(query): Query<SizeQuery>,
) -> Result<Json<DeallocateResponse>, ApiError> {
    let request_mb = query.mb()?;

    let simulator = Arc::clone(&state.simulator);
    let snapshot = tokio::task::spawn_blocking(move || simulator.deallocate(request_mb))
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("Deallocation task failed: {}", e),
            request_mb,
        })?
        .map_err(|error| ApiError::Deallocation { error, request_mb })?;

    info!(request_mb, blocks = snapshot.blocks, "HTTP: deallocation complete");

    Ok(Json(DeallocateResponse {
        status: "success".to_string(),
        deallocated_mb: request_mb,
        memory: state.simulator.usage().memory,
        allocated_blocks: snapshot.blocks,
        ledger_mb: snapshot.total_mb,
    }))
}
