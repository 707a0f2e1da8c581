//! Configuration for chain analysis

use serde::{Deserialize, Serialize};

use crate::core::{TrackerError, TrackerResult};

/// Strikes kept in each ranked strike table
pub const DEFAULT_TOP_STRIKES: usize = 15;

/// Volume/open-interest ratio a contract must exceed to be flagged
pub const DEFAULT_UNUSUAL_THRESHOLD: f64 = 0.5;

/// Maximum unusual contracts reported
pub const DEFAULT_UNUSUAL_LIMIT: usize = 10;

/// Configuration for [`ChainAnalyzer`](super::ChainAnalyzer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Strikes kept in the volume and open-interest tables
    /// Default: 15
    pub top_strikes: usize,

    /// Contracts qualify when volume / open interest > threshold
    /// Default: 0.5
    pub unusual_threshold: f64,

    /// Maximum unusual contracts reported
    /// Default: 10
    pub unusual_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_strikes: DEFAULT_TOP_STRIKES,
            unusual_threshold: DEFAULT_UNUSUAL_THRESHOLD,
            unusual_limit: DEFAULT_UNUSUAL_LIMIT,
        }
    }
}

impl AnalysisConfig {
    /// Lower threshold, longer list
    pub fn aggressive() -> Self {
        Self {
            unusual_threshold: 0.25,
            unusual_limit: 20,
            ..Default::default()
        }
    }

    /// Only contracts trading more than their open interest
    pub fn conservative() -> Self {
        Self {
            unusual_threshold: 1.0,
            unusual_limit: 5,
            ..Default::default()
        }
    }

    /// Reject values that would make the ranking meaningless
    pub fn validate(&self) -> TrackerResult<()> {
        if !self.unusual_threshold.is_finite() {
            return Err(TrackerError::invalid_input(format!(
                "unusual_threshold must be finite, got {}",
                self.unusual_threshold
            )));
        }
        Ok(())
    }
}
