//! Options-chain aggregation and unusual-activity detection
//!
//! Pure, synchronous transformations of a single [`Chain`](crate::core::Chain)
//! snapshot. Nothing here fetches, sleeps, caches or keeps state between calls.
//!
//! Two phases:
//! 1. **Strike aggregation**: volume and open interest per strike, per side
//! 2. **Signal extraction**: totals, put/call ratio, and contracts whose
//!    volume/open-interest ratio exceeds a threshold

mod aggregation;
mod analyzer;
mod config;
mod signals;

pub use aggregation::*;
pub use analyzer::*;
pub use config::*;
pub use signals::*;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::{ChainQuote, ContractRecord, OptionSide};

/// Map key for a strike price
///
/// Exact numeric match under `f64::total_cmp`; no tolerance or rounding.
#[derive(Debug, Clone, Copy)]
pub struct StrikeKey(pub f64);

impl PartialEq for StrikeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StrikeKey {}

impl PartialOrd for StrikeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StrikeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Accumulated volume and open interest at one strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeBucket {
    pub strike: f64,
    pub call_volume: i64,
    pub put_volume: i64,
    pub call_open_interest: i64,
    pub put_open_interest: i64,
}

impl StrikeBucket {
    /// Empty bucket at a strike
    pub fn new(strike: f64) -> Self {
        Self {
            strike,
            call_volume: 0,
            put_volume: 0,
            call_open_interest: 0,
            put_open_interest: 0,
        }
    }

    /// Add one record to the side it belongs to
    ///
    /// Sums saturate at the `i64` bounds instead of overflowing.
    pub fn accumulate(&mut self, side: OptionSide, record: &ContractRecord) {
        match side {
            OptionSide::Call => {
                self.call_volume = self.call_volume.saturating_add(record.volume_or_zero());
                self.call_open_interest = self
                    .call_open_interest
                    .saturating_add(record.open_interest_or_zero());
            }
            OptionSide::Put => {
                self.put_volume = self.put_volume.saturating_add(record.volume_or_zero());
                self.put_open_interest = self
                    .put_open_interest
                    .saturating_add(record.open_interest_or_zero());
            }
        }
    }

    pub fn total_volume(&self) -> i64 {
        self.call_volume.saturating_add(self.put_volume)
    }

    pub fn total_open_interest(&self) -> i64 {
        self.call_open_interest.saturating_add(self.put_open_interest)
    }
}

/// Display tier for an unusual contract
///
/// Presentation hint only; never used for filtering or ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityTier {
    /// Ratio above threshold, at most 1.0
    Elevated,
    /// Volume exceeds open interest
    Extreme,
}

impl ActivityTier {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            ActivityTier::Extreme
        } else {
            ActivityTier::Elevated
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityTier::Elevated => "elevated",
            ActivityTier::Extreme => "extreme",
        }
    }
}

/// A contract flagged for unusual activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusualEntry {
    pub side: OptionSide,
    #[serde(flatten)]
    pub record: ContractRecord,
    pub volume_to_open_interest_ratio: f64,
}

impl UnusualEntry {
    /// Score a record; `None` unless both volume and open interest are positive
    pub fn score(side: OptionSide, record: &ContractRecord) -> Option<Self> {
        let volume = record.volume_or_zero();
        let open_interest = record.open_interest_or_zero();
        if volume <= 0 || open_interest <= 0 {
            return None;
        }

        Some(Self {
            side,
            record: record.clone(),
            volume_to_open_interest_ratio: volume as f64 / open_interest as f64,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.volume_to_open_interest_ratio
    }

    pub fn strike(&self) -> f64 {
        self.record.strike
    }

    pub fn volume(&self) -> i64 {
        self.record.volume_or_zero()
    }

    pub fn open_interest(&self) -> i64 {
        self.record.open_interest_or_zero()
    }

    pub fn tier(&self) -> ActivityTier {
        ActivityTier::from_ratio(self.volume_to_open_interest_ratio)
    }
}

/// Chain-wide totals and put/call ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    pub total_call_volume: i64,
    pub total_put_volume: i64,
    pub total_call_open_interest: i64,
    pub total_put_open_interest: i64,
    /// Put volume / call volume, 0 when there is no call volume
    pub put_call_ratio: f64,
}

impl SentimentSummary {
    pub fn total_volume(&self) -> i64 {
        self.total_call_volume.saturating_add(self.total_put_volume)
    }

    pub fn total_open_interest(&self) -> i64 {
        self.total_call_open_interest
            .saturating_add(self.total_put_open_interest)
    }

    /// Share of volume on the call side, 0 when there is no volume
    pub fn call_volume_share(&self) -> f64 {
        let total = self.total_volume();
        if total == 0 {
            0.0
        } else {
            self.total_call_volume as f64 / total as f64
        }
    }
}

/// Everything derived from one chain snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAnalysis {
    pub symbol: String,
    pub expiration: Option<i64>,
    pub quote: Option<ChainQuote>,
    pub summary: SentimentSummary,
    /// Most active strikes by total volume, ascending by strike
    pub volume_by_strike: Vec<StrikeBucket>,
    /// Most active strikes by total open interest, ascending by strike
    pub open_interest_by_strike: Vec<StrikeBucket>,
    /// Unusual contracts, descending by ratio
    pub unusual: Vec<UnusualEntry>,
    /// Number of distinct strikes in the chain
    pub strike_count: usize,
}

impl ChainAnalysis {
    pub fn has_unusual_activity(&self) -> bool {
        !self.unusual.is_empty()
    }

    /// Unusual entries where volume exceeds open interest
    pub fn extreme_entries(&self) -> Vec<&UnusualEntry> {
        self.unusual
            .iter()
            .filter(|e| e.tier() == ActivityTier::Extreme)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strike_key_exact_match() {
        assert_eq!(StrikeKey(50.0), StrikeKey(50.0));
        assert_ne!(StrikeKey(50.0), StrikeKey(50.000001));
        assert!(StrikeKey(49.5) < StrikeKey(50.0));
    }

    #[test]
    fn test_score_requires_volume_and_open_interest() {
        let zero_oi = ContractRecord::new(10.0).with_volume(10).with_open_interest(0);
        assert!(UnusualEntry::score(OptionSide::Call, &zero_oi).is_none());

        let zero_vol = ContractRecord::new(10.0).with_volume(0).with_open_interest(10);
        assert!(UnusualEntry::score(OptionSide::Call, &zero_vol).is_none());

        let missing = ContractRecord::new(10.0);
        assert!(UnusualEntry::score(OptionSide::Put, &missing).is_none());

        let ok = ContractRecord::new(10.0).with_volume(30).with_open_interest(20);
        let entry = UnusualEntry::score(OptionSide::Put, &ok).unwrap();
        assert!((entry.ratio() - 1.5).abs() < 1e-12);
        assert_eq!(entry.side, OptionSide::Put);
        assert_eq!(entry.tier(), ActivityTier::Extreme);
    }

    #[test]
    fn test_activity_tier_boundary() {
        assert_eq!(ActivityTier::from_ratio(0.6), ActivityTier::Elevated);
        assert_eq!(ActivityTier::from_ratio(1.0), ActivityTier::Elevated);
        assert_eq!(ActivityTier::from_ratio(1.01), ActivityTier::Extreme);
    }

    #[test]
    fn test_bucket_totals() {
        let mut bucket = StrikeBucket::new(25.0);
        bucket.accumulate(
            OptionSide::Call,
            &ContractRecord::new(25.0).with_volume(10).with_open_interest(100),
        );
        bucket.accumulate(
            OptionSide::Put,
            &ContractRecord::new(25.0).with_volume(5).with_open_interest(40),
        );

        assert_eq!(bucket.total_volume(), 15);
        assert_eq!(bucket.total_open_interest(), 140);
    }
}
