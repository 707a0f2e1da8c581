//! Tracked crypto ETFs

use serde::Serialize;

/// A tracked fund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EtfInfo {
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Funds with listed options that the tracker follows
pub static TRACKED_ETFS: [EtfInfo; 6] = [
    EtfInfo { symbol: "IBIT", name: "BlackRock Bitcoin ETF" },
    EtfInfo { symbol: "ETHA", name: "BlackRock Ethereum ETF" },
    EtfInfo { symbol: "FBTC", name: "Fidelity Bitcoin ETF" },
    EtfInfo { symbol: "ARKB", name: "ARK 21Shares Bitcoin ETF" },
    EtfInfo { symbol: "BITB", name: "Bitwise Bitcoin ETF" },
    EtfInfo { symbol: "GBTC", name: "Grayscale Bitcoin Trust" },
];

pub const DEFAULT_SYMBOL: &str = "IBIT";

/// Look up a tracked fund, case-insensitive
pub fn find_etf(symbol: &str) -> Option<&'static EtfInfo> {
    TRACKED_ETFS
        .iter()
        .find(|etf| etf.symbol.eq_ignore_ascii_case(symbol.trim()))
}

/// All tracked symbols in display order
pub fn tracked_symbols() -> Vec<&'static str> {
    TRACKED_ETFS.iter().map(|etf| etf.symbol).collect()
}
