/*!
 * Health probe handler
 */

use crate::api::server::AppState;
use crate::api::types::HealthResponse;
use crate::monitoring::HealthVerdict;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::{debug, warn};

/// `GET /health` - 200 when healthy, 503 under pressure
pub async fn handle_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.simulator.health_probe() {
        HealthVerdict::Healthy { sample } => {
            debug!(resident_mb = sample.resident_mb, "Health probe: healthy");
            (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    reason: None,
                    memory: sample,
                }),
            )
        }
        HealthVerdict::Unhealthy { reason, sample } => {
            warn!(%reason, "Health probe: unhealthy");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(reason),
                    memory: sample,
                }),
            )
        }
    }
}
