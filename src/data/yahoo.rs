//! Yahoo Finance options fetcher
//!
//! Uses Yahoo Finance's unofficial v7 options endpoint. Data is delayed
//! ~15 minutes and intended for personal use.
//!
//! All pacing between requests lives here; the analytics never sleep or retry.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use crate::config::FetchConfig;
use crate::core::{Chain, ChainQuote, ContractRecord, TrackerError, TrackerResult};

use super::snapshot::{ExpiryChain, OptionsSnapshot, SymbolSnapshot};

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl YahooClient {
    /// Client with default settings
    pub fn new() -> TrackerResult<Self> {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> TrackerResult<Self> {
        config.validate()?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackerError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Available expirations (unix seconds) for a symbol
    pub fn get_expirations(&self, symbol: &str) -> TrackerResult<Vec<i64>> {
        let data = self.fetch_chain_data(symbol, None)?;
        Ok(data.expiration_dates)
    }

    /// Chain for one expiration; the front expiration when `None`
    ///
    /// A response without an options block is a data error, not an empty chain.
    pub fn get_option_chain(&self, symbol: &str, expiration: Option<i64>) -> TrackerResult<Chain> {
        let data = self.fetch_chain_data(symbol, expiration)?;
        build_chain(symbol, data, expiration)
    }

    /// Quote, expiration list and the first `max_expirations` chains
    ///
    /// Expirations that fail are logged and skipped. If the front request
    /// fails the snapshot carries the error and no chains.
    pub fn fetch_symbol(&self, symbol: &str) -> SymbolSnapshot {
        let front = self.fetch_chain_data(symbol, None);

        assemble_snapshot(symbol, front, self.config.max_expirations, |expiration| {
            let chain = self.get_option_chain(symbol, Some(expiration));
            thread::sleep(Duration::from_millis(self.config.expiry_delay_ms));
            chain
        })
    }

    /// Fetch every symbol, pausing between them
    pub fn fetch_all(&self, symbols: &[&str]) -> OptionsSnapshot {
        let mut snapshot = OptionsSnapshot::new();

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 {
                thread::sleep(Duration::from_millis(self.config.symbol_delay_ms));
            }
            tracing::info!("Fetching {}...", symbol);
            snapshot.insert(self.fetch_symbol(symbol));
        }

        snapshot.last_updated = Utc::now();
        snapshot
    }

    fn fetch_chain_data(
        &self,
        symbol: &str,
        expiration: Option<i64>,
    ) -> TrackerResult<YahooOptionChainData> {
        let url = match expiration {
            Some(ts) => format!("{}/options/{}?date={}", self.config.base_url, symbol, ts),
            None => format!("{}/options/{}", self.config.base_url, symbol),
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| TrackerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Network(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .map_err(|e| TrackerError::Network(e.to_string()))?;

        parse_options_response(&body)
    }
}

/// Parse an options response body down to its first result
fn parse_options_response(body: &str) -> TrackerResult<YahooOptionChainData> {
    let response: YahooOptionsResponse = serde_json::from_str(body)
        .map_err(|e| TrackerError::Data(format!("Failed to parse options: {}", e)))?;

    response
        .option_chain
        .result
        .into_iter()
        .next()
        .ok_or_else(|| TrackerError::data("No options data available"))
}

/// Build a symbol snapshot from the front response and per-expiry fetches
fn assemble_snapshot<F>(
    symbol: &str,
    front: TrackerResult<YahooOptionChainData>,
    max_expirations: usize,
    mut fetch_expiry: F,
) -> SymbolSnapshot
where
    F: FnMut(i64) -> TrackerResult<Chain>,
{
    let front = match front {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Error fetching {}: {}", symbol, e);
            return SymbolSnapshot::failed(symbol, e.to_string());
        }
    };

    let expiration_dates: Vec<i64> = front
        .expiration_dates
        .iter()
        .copied()
        .take(max_expirations)
        .collect();

    let mut options = Vec::with_capacity(expiration_dates.len());
    for &expiration in &expiration_dates {
        match fetch_expiry(expiration) {
            Ok(chain) => options.push(ExpiryChain {
                expiration_date: expiration,
                calls: chain.calls,
                puts: chain.puts,
            }),
            Err(e) => {
                tracing::warn!("Failed to get {} chain for {}: {}", symbol, expiration, e);
            }
        }
    }

    tracing::info!(
        "Fetched {} of {} expirations for {}",
        options.len(),
        expiration_dates.len(),
        symbol
    );

    SymbolSnapshot {
        symbol: symbol.to_string(),
        quote: front.quote.map(ChainQuote::from),
        expiration_dates,
        options,
        error: None,
        fetched_at: Utc::now(),
    }
}

/// Convert a response into a chain, dropping records without a strike
///
/// Fails when the response carries no options block for the expiration.
fn build_chain(
    symbol: &str,
    data: YahooOptionChainData,
    requested: Option<i64>,
) -> TrackerResult<Chain> {
    let options = data
        .options
        .into_iter()
        .next()
        .ok_or_else(|| TrackerError::data("No options data available"))?;

    let expiration = options
        .expiration_date
        .or(requested)
        .or_else(|| data.expiration_dates.first().copied());

    let mut chain = Chain::new(symbol);
    chain.expiration = expiration;
    chain.quote = data.quote.map(ChainQuote::from);

    for call in options.calls.into_iter().filter_map(YahooOptionData::into_record) {
        chain.add_call(call);
    }
    for put in options.puts.into_iter().filter_map(YahooOptionData::into_record) {
        chain.add_put(put);
    }

    Ok(chain)
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    #[serde(default)]
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    quote: Option<YahooQuoteData>,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteData {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketChangePercent")]
    regular_market_change_percent: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
}

impl From<YahooQuoteData> for ChainQuote {
    fn from(q: YahooQuoteData) -> Self {
        ChainQuote {
            regular_market_price: q.regular_market_price,
            regular_market_change_percent: q.regular_market_change_percent,
            bid: q.bid,
            ask: q.ask,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(rename = "expirationDate")]
    expiration_date: Option<i64>,
    #[serde(default)]
    calls: Vec<YahooOptionData>,
    #[serde(default)]
    puts: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    #[serde(rename = "contractSymbol")]
    contract_symbol: Option<String>,
    strike: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
    #[serde(rename = "lastPrice")]
    last_price: Option<f64>,
    volume: Option<i64>,
    #[serde(rename = "openInterest")]
    open_interest: Option<i64>,
    #[serde(rename = "impliedVolatility")]
    implied_volatility: Option<f64>,
}

impl YahooOptionData {
    fn into_record(self) -> Option<ContractRecord> {
        let strike = self.strike?;

        Some(ContractRecord {
            contract_symbol: self.contract_symbol,
            strike,
            volume: self.volume,
            open_interest: self.open_interest,
            last_price: self.last_price,
            implied_volatility: self.implied_volatility,
            bid: self.bid,
            ask: self.ask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "optionChain": {
            "result": [{
                "underlyingSymbol": "IBIT",
                "expirationDates": [1737072000, 1737676800, 1738281600, 1738886400],
                "strikes": [45.0, 50.0, 55.0],
                "quote": {
                    "symbol": "IBIT",
                    "regularMarketPrice": 52.37,
                    "regularMarketChangePercent": -1.84
                },
                "options": [{
                    "expirationDate": 1737072000,
                    "calls": [
                        {"contractSymbol": "IBIT250117C00050000", "strike": 50.0,
                         "lastPrice": 3.1, "volume": 4200, "openInterest": 3000,
                         "impliedVolatility": 0.62, "bid": 3.0, "ask": 3.2},
                        {"contractSymbol": "IBIT250117C00055000", "strike": 55.0,
                         "lastPrice": 0.9}
                    ],
                    "puts": [
                        {"strike": 45.0, "volume": 150, "openInterest": 900},
                        {"contractSymbol": "BROKEN", "volume": 5}
                    ]
                }]
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_and_build_chain() {
        let data = parse_options_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(data.expiration_dates.len(), 4);

        let chain = build_chain("IBIT", data, None).unwrap();
        assert_eq!(chain.symbol, "IBIT");
        assert_eq!(chain.expiration, Some(1_737_072_000));
        assert_eq!(chain.spot(), Some(52.37));
        assert_eq!(chain.calls.len(), 2);
        // Record without a strike is dropped
        assert_eq!(chain.puts.len(), 1);

        assert_eq!(chain.calls[0].volume, Some(4200));
        assert!((chain.calls[0].mid().unwrap() - 3.1).abs() < 1e-12);
        assert_eq!(chain.calls[1].volume, None);
    }

    #[test]
    fn test_empty_result_is_data_error() {
        let body = r#"{"optionChain": {"result": [], "error": null}}"#;
        match parse_options_response(body) {
            Err(TrackerError::Data(msg)) => assert_eq!(msg, "No options data available"),
            other => panic!("expected data error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_body_is_data_error() {
        assert!(matches!(
            parse_options_response("<html>Too Many Requests</html>"),
            Err(TrackerError::Data(_))
        ));
    }

    #[test]
    fn test_requested_expiration_used_when_missing() {
        let body = r#"{"optionChain": {"result": [{"options": [{"calls": [], "puts": []}]}]}}"#;
        let data = parse_options_response(body).unwrap();
        let chain = build_chain("ETHA", data, Some(1_738_281_600)).unwrap();

        assert_eq!(chain.expiration, Some(1_738_281_600));
        assert!(chain.is_empty());
        assert!(chain.quote.is_none());
    }

    #[test]
    fn test_missing_options_block_is_data_error() {
        let body = r#"{"optionChain": {"result": [{"expirationDates": [1737072000], "options": []}]}}"#;
        let data = parse_options_response(body).unwrap();
        match build_chain("IBIT", data, Some(1_737_072_000)) {
            Err(TrackerError::Data(msg)) => assert_eq!(msg, "No options data available"),
            other => panic!("expected data error, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_front_request_marks_snapshot() {
        let mut calls = 0;
        let snapshot = assemble_snapshot(
            "FBTC",
            Err(TrackerError::network("HTTP 429")),
            3,
            |_| {
                calls += 1;
                Err(TrackerError::network("unreachable"))
            },
        );

        assert_eq!(calls, 0);
        assert!(snapshot.is_error());
        assert_eq!(snapshot.error.as_deref(), Some("Network error: HTTP 429"));
        assert!(snapshot.options.is_empty());
        assert!(snapshot.expiration_dates.is_empty());
    }

    #[test]
    fn test_failed_and_empty_expirations_are_skipped() {
        let front = parse_options_response(SAMPLE_RESPONSE);
        let mut requested = Vec::new();

        let snapshot = assemble_snapshot("IBIT", front, 3, |expiration| {
            requested.push(expiration);
            match expiration {
                1_737_676_800 => Err(TrackerError::network("HTTP 500")),
                1_738_281_600 => {
                    let body = r#"{"optionChain": {"result": [{"options": []}]}}"#;
                    build_chain("IBIT", parse_options_response(body)?, Some(expiration))
                }
                _ => build_chain("IBIT", parse_options_response(SAMPLE_RESPONSE)?, Some(expiration)),
            }
        });

        assert_eq!(requested, vec![1_737_072_000, 1_737_676_800, 1_738_281_600]);
        assert!(!snapshot.is_error());
        assert_eq!(snapshot.expiration_dates, requested);
        assert_eq!(snapshot.quote.as_ref().and_then(|q| q.regular_market_price), Some(52.37));
        assert_eq!(snapshot.options.len(), 1);
        assert_eq!(snapshot.options[0].expiration_date, 1_737_072_000);
        assert_eq!(snapshot.options[0].calls.len(), 2);
    }

    #[test]
    #[ignore] // Requires network
    fn test_get_option_chain() {
        let client = YahooClient::new().unwrap();
        let chain = client.get_option_chain("IBIT", None).unwrap();

        println!(
            "IBIT chain: {} calls, {} puts",
            chain.calls.len(),
            chain.puts.len()
        );
        assert!(!chain.is_empty());
    }

    #[test]
    #[ignore] // Requires network
    fn test_fetch_symbol() {
        let client = YahooClient::with_config(FetchConfig {
            max_expirations: 1,
            ..Default::default()
        })
        .unwrap();
        let snapshot = client.fetch_symbol("IBIT");

        assert!(snapshot.error.is_none(), "{:?}", snapshot.error);
        assert!(snapshot.options.len() <= 1);
    }
}
