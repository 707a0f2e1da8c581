//! Data retrieval and storage
//!
//! Handles:
//! - Yahoo Finance API for ETF option chains
//! - The options snapshot file
//! - The fixed universe of tracked ETFs

pub mod snapshot;
pub mod universe;
pub mod yahoo;

pub use snapshot::*;
pub use universe::*;
pub use yahoo::*;
