//! # ETF Options - Crypto ETF Options Activity Tracker
//!
//! Fetches option chains for spot crypto ETFs (IBIT, ETHA, FBTC, ARKB, BITB,
//! GBTC) from Yahoo Finance and summarises where the activity is.
//!
//! ## Overview
//!
//! For one chain (calls and puts at one expiration) the analytics produce:
//! - **Strike tables**: volume and open interest per strike, top strikes ranked
//! - **Sentiment**: total call/put volume and open interest, put/call ratio
//! - **Unusual activity**: contracts whose volume/open-interest ratio exceeds
//!   a threshold, ranked by that ratio
//!
//! The analytics are pure functions of the chain. Fetching, pacing, the
//! snapshot file and rendering are separate layers around them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use etf_options::prelude::*;
//!
//! let client = YahooClient::new().unwrap();
//! let chain = client.get_option_chain("IBIT", None).unwrap();
//!
//! let analysis = analyze_chain(&chain);
//! println!("Put/Call: {:.2}", analysis.summary.put_call_ratio);
//! for entry in &analysis.unusual {
//!     println!("{} {} {:.2}x", entry.side.label(), entry.strike(), entry.ratio());
//! }
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Price options or model volatility
//! - Store history across snapshots
//! - Stream real-time data

pub mod analytics;
pub mod config;
pub mod core;
pub mod data;
pub mod report;
pub mod tracker;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        Chain, ChainQuote, ContractRecord, OptionSide, TrackerError, TrackerResult,
    };

    // Analytics
    pub use crate::analytics::{
        aggregate_by_strike, analyze_chain, detect_unusual, summarize, top_by_open_interest,
        top_by_volume, ActivityTier, AnalysisConfig, ChainAnalysis, ChainAnalyzer,
        SentimentSummary, StrikeBucket, StrikeBuckets, StrikeKey, UnusualEntry,
        DEFAULT_TOP_STRIKES, DEFAULT_UNUSUAL_LIMIT, DEFAULT_UNUSUAL_THRESHOLD,
    };

    // Data
    pub use crate::data::{
        find_etf, tracked_symbols, EtfInfo, ExpiryChain, OptionsSnapshot, SnapshotStore,
        SymbolSnapshot, YahooClient, DEFAULT_SYMBOL, TRACKED_ETFS,
    };

    // Config, state, presentation
    pub use crate::config::{FetchConfig, TrackerConfig};
    pub use crate::report::{format_expiration, format_number, format_price, render_report, Report};
    pub use crate::tracker::{Tracker, TrackerStatus};
}

// Re-export main types at crate root
pub use crate::core::{TrackerError, TrackerResult};
pub use crate::analytics::{analyze_chain, ChainAnalysis, ChainAnalyzer};
