/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export ledger errors from memory module
pub use crate::memory::{AllocationError, DeallocationError};

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the PRESSURE_* environment variables. Unset a variable to use its default.")
    )]
    Invalid { key: String, value: String },
}
