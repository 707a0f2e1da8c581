//! Tracker configuration
//!
//! Loaded from JSON; every field falls back to its default when omitted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analytics::AnalysisConfig;
use crate::core::{TrackerError, TrackerResult};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Ranking and threshold settings
    pub analysis: AnalysisConfig,
    /// Yahoo Finance retrieval settings
    pub fetch: FetchConfig,
    /// Where `fetch` writes the options snapshot
    pub snapshot_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            fetch: FetchConfig::default(),
            snapshot_path: PathBuf::from("public/data/options.json"),
        }
    }
}

impl TrackerConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> TrackerResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: TrackerConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        self.analysis.validate()?;
        self.fetch.validate()
    }
}

/// Retrieval settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Yahoo Finance v7 finance endpoint
    pub base_url: String,
    /// Browser user agent; Yahoo rejects the default client agent
    pub user_agent: String,
    /// Expirations fetched per symbol
    /// Default: 3
    pub max_expirations: usize,
    /// Pause after each expiration request
    /// Default: 500ms
    pub expiry_delay_ms: u64,
    /// Pause between symbols
    /// Default: 1000ms
    pub symbol_delay_ms: u64,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v7/finance".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            max_expirations: 3,
            expiry_delay_ms: 500,
            symbol_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> TrackerResult<()> {
        if self.base_url.is_empty() {
            return Err(TrackerError::invalid_input("base_url must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(TrackerError::invalid_input("timeout_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_partial_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        fs::write(
            &path,
            r#"{ "analysis": { "unusual_limit": 25 }, "fetch": { "max_expirations": 1 } }"#,
        )
        .unwrap();

        let config = TrackerConfig::load(&path).unwrap();
        assert_eq!(config.analysis.unusual_limit, 25);
        assert_eq!(config.analysis.top_strikes, 15);
        assert_eq!(config.fetch.max_expirations, 1);
        assert_eq!(config.fetch.expiry_delay_ms, 500);
        assert_eq!(config.snapshot_path, PathBuf::from("public/data/options.json"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        fs::write(&path, r#"{ "fetch": { "timeout_secs": 0 } }"#).unwrap();

        assert!(matches!(
            TrackerConfig::load(&path),
            Err(TrackerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = TrackerConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(TrackerError::IO(_))));
    }
}
