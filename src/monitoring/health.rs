/*!
 * Health Evaluator
 * Pure threshold check shared by the probe path and the pressure monitor
 */

use super::sampler::UsageSample;
use crate::core::config::ThresholdConfig;
use serde::Serialize;

/// Health verdict derived from one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy { sample: UsageSample },
    Unhealthy { reason: String, sample: UsageSample },
}

impl HealthVerdict {
    #[inline]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthVerdict::Healthy { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            HealthVerdict::Healthy { .. } => None,
            HealthVerdict::Unhealthy { reason, .. } => Some(reason),
        }
    }

    pub fn sample(&self) -> &UsageSample {
        match self {
            HealthVerdict::Healthy { sample } | HealthVerdict::Unhealthy { sample, .. } => sample,
        }
    }
}

/// Unhealthy iff resident size is strictly above the threshold
pub fn evaluate(sample: &UsageSample, threshold: &ThresholdConfig) -> HealthVerdict {
    if sample.resident_mb > threshold.threshold_mb {
        HealthVerdict::Unhealthy {
            reason: format!(
                "resident memory {:.2} MB exceeds threshold {:.2} MB",
                sample.resident_mb, threshold.threshold_mb
            ),
            sample: sample.clone(),
        }
    } else {
        HealthVerdict::Healthy {
            sample: sample.clone(),
        }
    }
}
