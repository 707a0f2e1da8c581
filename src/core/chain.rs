//! Option chain for a single expiration
//!
//! The input to every analytics function: calls, puts and an optional
//! underlying quote for one symbol at one expiration.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::option::{ContractRecord, OptionSide};

/// Underlying quote attached to a chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainQuote {
    /// Last regular-session price
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    /// Session change in percent (1.5 = +1.5%)
    #[serde(default)]
    pub regular_market_change_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
}

/// Calls and puts for one symbol and one expiration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    /// Underlying symbol
    pub symbol: String,
    /// Expiration as unix seconds
    #[serde(default)]
    pub expiration: Option<i64>,
    /// Underlying quote
    #[serde(default)]
    pub quote: Option<ChainQuote>,
    /// Call records in provider order
    #[serde(default)]
    pub calls: Vec<ContractRecord>,
    /// Put records in provider order
    #[serde(default)]
    pub puts: Vec<ContractRecord>,
}

impl Chain {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn with_expiration(mut self, expiration: i64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_quote(mut self, quote: ChainQuote) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Append a call. Order is preserved; ranking tie-breaks depend on it.
    pub fn add_call(&mut self, record: ContractRecord) {
        self.calls.push(record);
    }

    /// Append a put
    pub fn add_put(&mut self, record: ContractRecord) {
        self.puts.push(record);
    }

    /// All records tagged with their side, calls first
    pub fn records(&self) -> impl Iterator<Item = (OptionSide, &ContractRecord)> {
        self.calls
            .iter()
            .map(|r| (OptionSide::Call, r))
            .chain(self.puts.iter().map(|r| (OptionSide::Put, r)))
    }

    /// Distinct strikes across both sides, ascending
    pub fn strikes(&self) -> Vec<f64> {
        let mut strikes: Vec<f64> = self.records().map(|(_, r)| r.strike).collect();
        strikes.sort_by(|a, b| a.total_cmp(b));
        strikes.dedup();
        strikes
    }

    /// Expiration as a calendar date (UTC)
    pub fn expiration_date(&self) -> Option<NaiveDate> {
        self.expiration
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive())
    }

    /// Underlying price, if quoted
    pub fn spot(&self) -> Option<f64> {
        self.quote.as_ref().and_then(|q| q.regular_market_price)
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strikes_are_distinct_and_sorted() {
        let mut chain = Chain::new("IBIT");
        chain.add_call(ContractRecord::new(55.0));
        chain.add_call(ContractRecord::new(50.0));
        chain.add_put(ContractRecord::new(50.0));
        chain.add_put(ContractRecord::new(45.0));

        assert_eq!(chain.strikes(), vec![45.0, 50.0, 55.0]);
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn test_records_keep_calls_before_puts() {
        let mut chain = Chain::new("FBTC");
        chain.add_put(ContractRecord::new(10.0));
        chain.add_call(ContractRecord::new(20.0));

        let sides: Vec<OptionSide> = chain.records().map(|(side, _)| side).collect();
        assert_eq!(sides, vec![OptionSide::Call, OptionSide::Put]);
    }

    #[test]
    fn test_expiration_date() {
        // 2025-01-17 00:00:00 UTC
        let chain = Chain::new("IBIT").with_expiration(1_737_072_000);
        assert_eq!(
            chain.expiration_date(),
            NaiveDate::from_ymd_opt(2025, 1, 17)
        );
        assert!(Chain::new("IBIT").expiration_date().is_none());
    }
}
