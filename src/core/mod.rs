//! Core data types
//!
//! Defines fundamental types:
//! - OptionContract: strike, open interest, implied vol, side
//! - MarketState: spot, rate, time to expiry
//! - ChainSnapshot: one expiry as delivered by the quote provider
//! - GreekResult / ExposureRow: per-contract Greeks and dollar exposure

pub mod option;
pub mod quote;
pub mod greeks;
pub mod error;

pub use option::*;
pub use quote::*;
pub use greeks::*;
pub use error::*;
