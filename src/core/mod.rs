//! Core data types for the ETF options tracker
//!
//! Defines fundamental types:
//! - ContractRecord: one contract observation (strike, volume, OI, price, IV)
//! - OptionSide: call or put
//! - Chain: calls and puts for one symbol and expiration
//! - TrackerError: shared error type

pub mod chain;
pub mod error;
pub mod option;

pub use chain::*;
pub use error::*;
pub use option::*;
