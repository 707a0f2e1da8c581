//! Options snapshot file
//!
//! Persists one fetch pass over all tracked ETFs as pretty-printed JSON so the
//! report can be rendered offline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Chain, ChainQuote, ContractRecord, TrackerError, TrackerResult};

/// Calls and puts for one expiration inside a symbol snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryChain {
    /// Expiration as unix seconds
    pub expiration_date: i64,
    #[serde(default)]
    pub calls: Vec<ContractRecord>,
    #[serde(default)]
    pub puts: Vec<ContractRecord>,
}

/// Fetch result for one symbol
///
/// A failed fetch is recorded with `error` set and no chains, never as a
/// partially filled chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSnapshot {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<ChainQuote>,
    #[serde(default)]
    pub expiration_dates: Vec<i64>,
    #[serde(default)]
    pub options: Vec<ExpiryChain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl SymbolSnapshot {
    /// Snapshot for a symbol whose fetch failed
    pub fn failed(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quote: None,
            expiration_dates: Vec::new(),
            options: Vec::new(),
            error: Some(error.into()),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Chain for an expiration; the first stored one when `expiration` is `None`
    pub fn chain(&self, expiration: Option<i64>) -> TrackerResult<Chain> {
        if let Some(error) = &self.error {
            return Err(TrackerError::data(format!(
                "{} snapshot has no data: {}",
                self.symbol, error
            )));
        }

        let expiry = match expiration {
            Some(ts) => self.options.iter().find(|o| o.expiration_date == ts),
            None => self.options.first(),
        }
        .ok_or_else(|| {
            TrackerError::data(format!(
                "No chain for {} at expiration {:?}",
                self.symbol, expiration
            ))
        })?;

        Ok(Chain {
            symbol: self.symbol.clone(),
            expiration: Some(expiry.expiration_date),
            quote: self.quote.clone(),
            calls: expiry.calls.clone(),
            puts: expiry.puts.clone(),
        })
    }
}

/// One fetch pass over the tracked symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSnapshot {
    pub last_updated: DateTime<Utc>,
    pub data: BTreeMap<String, SymbolSnapshot>,
}

impl OptionsSnapshot {
    pub fn new() -> Self {
        Self {
            last_updated: Utc::now(),
            data: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, snapshot: SymbolSnapshot) {
        self.data.insert(snapshot.symbol.clone(), snapshot);
    }

    /// Symbol lookup, case-insensitive
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolSnapshot> {
        self.data.get(&symbol.trim().to_ascii_uppercase())
    }

    /// Symbols whose fetch failed
    pub fn failed_symbols(&self) -> Vec<&str> {
        self.data
            .values()
            .filter(|s| s.is_error())
            .map(|s| s.symbol.as_str())
            .collect()
    }
}

impl Default for OptionsSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and writes the snapshot file
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot, creating parent directories as needed
    pub fn save(&self, snapshot: &OptionsSnapshot) -> TrackerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;

        tracing::info!("Saved options snapshot to {:?}", self.path);
        Ok(())
    }

    /// Read the snapshot; `None` when the file does not exist
    pub fn load(&self) -> TrackerResult<Option<OptionsSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let snapshot: OptionsSnapshot = serde_json::from_str(&json)?;

        tracing::info!(
            "Loaded options snapshot from {:?} ({} symbols)",
            self.path,
            snapshot.data.len()
        );
        Ok(Some(snapshot))
    }

    /// Whether the file exists and was written within `max_age_hours`
    pub fn is_fresh(&self, max_age_hours: i64) -> bool {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };

        let modified: DateTime<Utc> = modified.into();
        Utc::now() - modified < Duration::hours(max_age_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_symbol() -> SymbolSnapshot {
        SymbolSnapshot {
            symbol: "IBIT".to_string(),
            quote: Some(ChainQuote {
                regular_market_price: Some(52.1),
                regular_market_change_percent: Some(2.3),
                ..Default::default()
            }),
            expiration_dates: vec![1_737_072_000, 1_737_676_800],
            options: vec![
                ExpiryChain {
                    expiration_date: 1_737_072_000,
                    calls: vec![ContractRecord::new(50.0).with_volume(10)],
                    puts: vec![],
                },
                ExpiryChain {
                    expiration_date: 1_737_676_800,
                    calls: vec![],
                    puts: vec![ContractRecord::new(45.0).with_open_interest(7)],
                },
            ],
            error: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("public/data/options.json"));
        assert!(store.load().unwrap().is_none());
        assert!(!store.is_fresh(24));

        let mut snapshot = OptionsSnapshot::new();
        snapshot.insert(sample_symbol());
        snapshot.insert(SymbolSnapshot::failed("GBTC", "HTTP 429"));
        store.save(&snapshot).unwrap();

        assert!(store.is_fresh(24));
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.failed_symbols(), vec!["GBTC"]);
    }

    #[test]
    fn test_file_layout_uses_camel_case() {
        let mut snapshot = OptionsSnapshot::new();
        snapshot.insert(sample_symbol());
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"expirationDates\""));
        assert!(json.contains("\"regularMarketPrice\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_chain_selection() {
        let symbol = sample_symbol();

        let front = symbol.chain(None).unwrap();
        assert_eq!(front.expiration, Some(1_737_072_000));
        assert_eq!(front.calls.len(), 1);
        assert_eq!(front.spot(), Some(52.1));

        let second = symbol.chain(Some(1_737_676_800)).unwrap();
        assert_eq!(second.puts.len(), 1);

        assert!(symbol.chain(Some(42)).is_err());
    }

    #[test]
    fn test_failed_symbol_has_no_chain() {
        let failed = SymbolSnapshot::failed("ARKB", "No options data available");
        assert!(matches!(failed.chain(None), Err(TrackerError::Data(_))));
    }

    #[test]
    fn test_symbol_lookup_is_case_insensitive() {
        let mut snapshot = OptionsSnapshot::new();
        snapshot.insert(sample_symbol());
        assert!(snapshot.symbol("ibit").is_some());
        assert!(snapshot.symbol("ETHA").is_none());
    }
}
