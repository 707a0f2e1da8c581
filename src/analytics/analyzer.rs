//! ChainAnalyzer - runs both stages over one chain

use crate::core::Chain;

use super::{
    aggregate_by_strike, detect_unusual, summarize, top_by_open_interest, top_by_volume,
    AnalysisConfig, ChainAnalysis,
};

/// Runs aggregation and signal extraction with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct ChainAnalyzer {
    config: AnalysisConfig,
}

impl ChainAnalyzer {
    /// Analyzer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    /// Derive every summary for a chain snapshot
    pub fn analyze(&self, chain: &Chain) -> ChainAnalysis {
        let buckets = aggregate_by_strike(&chain.calls, &chain.puts);

        ChainAnalysis {
            symbol: chain.symbol.clone(),
            expiration: chain.expiration,
            quote: chain.quote.clone(),
            summary: summarize(&chain.calls, &chain.puts),
            volume_by_strike: top_by_volume(&buckets, self.config.top_strikes),
            open_interest_by_strike: top_by_open_interest(&buckets, self.config.top_strikes),
            unusual: detect_unusual(
                &chain.calls,
                &chain.puts,
                self.config.unusual_threshold,
                self.config.unusual_limit,
            ),
            strike_count: buckets.len(),
        }
    }
}

/// Analyze a chain with default settings
pub fn analyze_chain(chain: &Chain) -> ChainAnalysis {
    ChainAnalyzer::new().analyze(chain)
}
