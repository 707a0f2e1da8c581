//! Option contract records
//!
//! One observation of a listed contract as reported by the data provider.

use serde::{Deserialize, Serialize};

/// Contract side (Call or Put)
///
/// Not carried on the raw record; assigned by which list of the chain
/// the record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    /// Tag used in tables
    pub fn label(&self) -> &'static str {
        match self {
            OptionSide::Call => "CALL",
            OptionSide::Put => "PUT",
        }
    }
}

/// Single option contract observation
///
/// Missing `volume`/`open_interest` are legal and count as zero in every
/// aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    /// Exchange contract symbol (e.g. "IBIT250117C00050000")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_symbol: Option<String>,
    /// Strike price
    pub strike: f64,
    /// Contracts traded in the session
    #[serde(default)]
    pub volume: Option<i64>,
    /// Outstanding contracts
    #[serde(default)]
    pub open_interest: Option<i64>,
    /// Last traded price
    #[serde(default)]
    pub last_price: Option<f64>,
    /// Implied volatility as a fraction
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
}

impl ContractRecord {
    /// Record with only a strike
    pub fn new(strike: f64) -> Self {
        Self {
            strike,
            ..Default::default()
        }
    }

    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_open_interest(mut self, open_interest: i64) -> Self {
        self.open_interest = Some(open_interest);
        self
    }

    pub fn with_last_price(mut self, last_price: f64) -> Self {
        self.last_price = Some(last_price);
        self
    }

    pub fn with_implied_volatility(mut self, iv: f64) -> Self {
        self.implied_volatility = Some(iv);
        self
    }

    /// Volume, zero when absent
    pub fn volume_or_zero(&self) -> i64 {
        self.volume.unwrap_or(0)
    }

    /// Open interest, zero when absent
    pub fn open_interest_or_zero(&self) -> i64 {
        self.open_interest.unwrap_or(0)
    }

    /// Mid price from bid/ask
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some((b + a) / 2.0),
            _ => None,
        }
    }
}
