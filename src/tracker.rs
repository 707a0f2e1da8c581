//! Tracker state
//!
//! Stateful shell around the pure analytics: holds the selected symbol and
//! expiration, the latest chain and its analysis, and the loading/error flags
//! a front end needs. The analysis is recomputed whenever a new chain lands.

use chrono::{DateTime, Utc};

use crate::analytics::{AnalysisConfig, ChainAnalysis, ChainAnalyzer};
use crate::core::{Chain, TrackerError, TrackerResult};
use crate::data::{find_etf, DEFAULT_SYMBOL};

/// Expirations offered for selection
pub const VISIBLE_EXPIRATIONS: usize = 8;

/// What a front end should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStatus {
    /// First fetch in flight, nothing to show yet
    Loading,
    /// Fetch failed and there is no earlier analysis
    Failed,
    /// Nothing fetched
    Empty,
    /// Analysis available (possibly stale while a refresh runs)
    Ready,
}

pub struct Tracker {
    analyzer: ChainAnalyzer,
    symbol: String,
    expirations: Vec<i64>,
    selected_expiration: Option<i64>,
    chain: Option<Chain>,
    analysis: Option<ChainAnalysis>,
    loading: bool,
    error: Option<String>,
    last_update: Option<DateTime<Utc>>,
}

impl Tracker {
    /// Tracker on the default symbol
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            analyzer: ChainAnalyzer::with_config(config),
            symbol: DEFAULT_SYMBOL.to_string(),
            expirations: Vec::new(),
            selected_expiration: None,
            chain: None,
            analysis: None,
            loading: false,
            error: None,
            last_update: None,
        }
    }

    pub fn analysis_config(&self) -> &AnalysisConfig {
        self.analyzer.config()
    }

    /// Replace the analysis settings and recompute from the held chain
    pub fn set_analysis_config(&mut self, config: AnalysisConfig) {
        self.analyzer.set_config(config);
        if let Some(chain) = &self.chain {
            self.analysis = Some(self.analyzer.analyze(chain));
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn selected_expiration(&self) -> Option<i64> {
        self.selected_expiration
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    pub fn analysis(&self) -> Option<&ChainAnalysis> {
        self.analysis.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Switch to another tracked ETF, dropping everything derived from the old one
    pub fn select_symbol(&mut self, symbol: &str) -> TrackerResult<()> {
        let etf = find_etf(symbol)
            .ok_or_else(|| TrackerError::invalid_input(format!("{} is not a tracked ETF", symbol)))?;

        if etf.symbol != self.symbol {
            self.symbol = etf.symbol.to_string();
            self.expirations.clear();
            self.selected_expiration = None;
            self.chain = None;
            self.analysis = None;
            self.error = None;
            self.loading = false;
        }
        Ok(())
    }

    /// Choose an expiration for the next refresh
    pub fn select_expiration(&mut self, expiration: i64) {
        self.selected_expiration = Some(expiration);
    }

    /// Expiration list reported by the provider
    pub fn set_expirations(&mut self, expirations: Vec<i64>) {
        self.expirations = expirations;
    }

    /// Expirations offered for selection
    pub fn visible_expirations(&self) -> &[i64] {
        let n = self.expirations.len().min(VISIBLE_EXPIRATIONS);
        &self.expirations[..n]
    }

    /// Mark a refresh as in flight
    pub fn begin_refresh(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Install a freshly fetched chain and recompute the analysis
    ///
    /// Returns `false` and changes nothing if the chain belongs to a symbol
    /// or expiration that is no longer selected.
    pub fn apply_chain(&mut self, chain: Chain) -> bool {
        if !chain.symbol.eq_ignore_ascii_case(&self.symbol) {
            tracing::debug!(
                "Discarding {} chain, tracker is on {}",
                chain.symbol,
                self.symbol
            );
            return false;
        }

        if self.selected_expiration.is_some() && chain.expiration != self.selected_expiration {
            tracing::debug!(
                "Discarding {} chain for expiration {:?}, tracker is on {:?}",
                chain.symbol,
                chain.expiration,
                self.selected_expiration
            );
            return false;
        }

        if self.selected_expiration.is_none() {
            self.selected_expiration = chain
                .expiration
                .or_else(|| self.expirations.first().copied());
        }

        self.analysis = Some(self.analyzer.analyze(&chain));
        self.chain = Some(chain);
        self.loading = false;
        self.error = None;
        self.last_update = Some(Utc::now());
        true
    }

    /// Record a failed refresh; the previous analysis is kept
    pub fn apply_error(&mut self, error: &TrackerError) {
        tracing::warn!("Refresh of {} failed: {}", self.symbol, error);
        self.loading = false;
        self.error = Some(error.to_string());
    }

    pub fn status(&self) -> TrackerStatus {
        match (&self.analysis, self.loading, &self.error) {
            (Some(_), _, _) => TrackerStatus::Ready,
            (None, true, _) => TrackerStatus::Loading,
            (None, false, Some(_)) => TrackerStatus::Failed,
            (None, false, None) => TrackerStatus::Empty,
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
