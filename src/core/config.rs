/*!
 * Configuration
 * Startup configuration loaded once from the environment
 *
 * Environment variables:
 * - PRESSURE_THRESHOLD_MB: resident-size health threshold (default: 230)
 * - PRESSURE_SAMPLE_INTERVAL_MS: monitor interval (default: 5000)
 * - PRESSURE_MAX_CONSECUTIVE_FAILURES: failures before self-termination (default: 5)
 * - PRESSURE_MAX_ALLOCATION_MB: per-call allocation cap (default: 800)
 * - PRESSURE_LISTEN_ADDR: HTTP listen address (default: 0.0.0.0:5000)
 * - PRESSURE_TRACE_JSON: JSON log output (default: false)
 */

use super::errors::{ConfigError, ConfigResult};
use super::limits::{
    DEFAULT_LISTEN_ADDR, DEFAULT_MAX_ALLOCATION_MB, DEFAULT_MAX_CONSECUTIVE_FAILURES,
    DEFAULT_SAMPLE_INTERVAL, DEFAULT_THRESHOLD_MB,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_THRESHOLD_MB: &str = "PRESSURE_THRESHOLD_MB";
pub const ENV_SAMPLE_INTERVAL_MS: &str = "PRESSURE_SAMPLE_INTERVAL_MS";
pub const ENV_MAX_CONSECUTIVE_FAILURES: &str = "PRESSURE_MAX_CONSECUTIVE_FAILURES";
pub const ENV_MAX_ALLOCATION_MB: &str = "PRESSURE_MAX_ALLOCATION_MB";
pub const ENV_LISTEN_ADDR: &str = "PRESSURE_LISTEN_ADDR";
pub const ENV_TRACE_JSON: &str = "PRESSURE_TRACE_JSON";

/// Health and escalation thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub threshold_mb: f64,
    pub max_consecutive_failures: u32,
    pub sample_interval_ms: u64,
}

impl ThresholdConfig {
    pub fn new(threshold_mb: f64) -> Self {
        Self {
            threshold_mb,
            ..Self::default()
        }
    }

    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max;
        self
    }

    pub fn with_sample_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }

    #[inline]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold_mb: DEFAULT_THRESHOLD_MB,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
        }
    }
}

/// Full service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub threshold: ThresholdConfig,
    pub max_allocation_mb: u64,
    pub listen_addr: String,
    pub trace_json: bool,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let threshold_mb = parse_or(&lookup, ENV_THRESHOLD_MB, defaults.threshold.threshold_mb)?;
        if !threshold_mb.is_finite() || threshold_mb < 0.0 {
            return Err(invalid(ENV_THRESHOLD_MB, threshold_mb));
        }

        let sample_interval_ms = parse_or(
            &lookup,
            ENV_SAMPLE_INTERVAL_MS,
            defaults.threshold.sample_interval_ms,
        )?;
        if sample_interval_ms == 0 {
            return Err(invalid(ENV_SAMPLE_INTERVAL_MS, sample_interval_ms));
        }

        let max_consecutive_failures = parse_or(
            &lookup,
            ENV_MAX_CONSECUTIVE_FAILURES,
            defaults.threshold.max_consecutive_failures,
        )?;
        let max_allocation_mb =
            parse_or(&lookup, ENV_MAX_ALLOCATION_MB, defaults.max_allocation_mb)?;
        let listen_addr = lookup(ENV_LISTEN_ADDR).unwrap_or(defaults.listen_addr);
        let trace_json = lookup(ENV_TRACE_JSON)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.trace_json);

        Ok(Self {
            threshold: ThresholdConfig {
                threshold_mb,
                max_consecutive_failures,
                sample_interval_ms,
            },
            max_allocation_mb,
            listen_addr,
            trace_json,
        })
    }

    pub fn with_threshold(mut self, threshold: ThresholdConfig) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_allocation_mb(mut self, cap: u64) -> Self {
        self.max_allocation_mb = cap;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: ThresholdConfig::default(),
            max_allocation_mb: DEFAULT_MAX_ALLOCATION_MB,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            trace_json: false,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}
