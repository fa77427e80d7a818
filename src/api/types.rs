/*!
 * API Types
 * Request and response payloads for the HTTP surface
 */

use crate::core::limits::DEFAULT_REQUEST_MB;
use crate::memory::{AllocationError, DeallocationError};
use crate::monitoring::UsageSample;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

/// `?mb=N` query parameter
///
/// Kept as raw text so a malformed value still yields a JSON error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SizeQuery {
    pub mb: Option<String>,
}

impl SizeQuery {
    /// Requested size in MB, or `DEFAULT_REQUEST_MB` when absent
    pub fn mb(&self) -> Result<u64, ApiError> {
        match self.mb.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_REQUEST_MB),
            Some(raw) => raw.parse().map_err(|_| ApiError::InvalidSize {
                raw: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllocateResponse {
    pub status: String,
    pub allocated_mb: u64,
    pub memory: UsageSample,
    pub allocated_blocks: usize,
    pub ledger_mb: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeallocateResponse {
    pub status: String,
    pub deallocated_mb: u64,
    pub memory: UsageSample,
    pub allocated_blocks: usize,
    pub ledger_mb: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub memory: UsageSample,
    pub allocated_blocks: usize,
    pub allocated_mb: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub memory: UsageSample,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_mb: Option<u64>,
}

/// Ledger errors mapped onto HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    Allocation { error: AllocationError, request_mb: u64 },
    Deallocation { error: DeallocationError, request_mb: u64 },
    /// `mb` was present but not a whole number of MB
    InvalidSize { raw: String },
    /// The blocking worker running the ledger operation died
    Internal { message: String, request_mb: u64 },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Allocation { error, .. } => match error {
                AllocationError::RequestTooLarge { .. } | AllocationError::InvalidSize => {
                    StatusCode::BAD_REQUEST
                }
                AllocationError::AllocationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Deallocation { .. } | ApiError::InvalidSize { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        let (code, message, request_mb) = match self {
            ApiError::Allocation { error, request_mb } => {
                (error.code(), error.to_string(), Some(*request_mb))
            }
            ApiError::Deallocation { error, request_mb } => {
                (error.code(), error.to_string(), Some(*request_mb))
            }
            ApiError::InvalidSize { raw } => (
                "invalid_size",
                format!("Invalid size {:?}: expected a whole number of MB", raw),
                None,
            ),
            ApiError::Internal {
                message,
                request_mb,
            } => ("internal_error", message.clone(), Some(*request_mb)),
        };
        ErrorResponse {
            status: "error".to_string(),
            code: code.to_string(),
            message,
            request_mb,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
