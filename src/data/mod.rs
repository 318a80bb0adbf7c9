//! Data fetching and storage
//!
//! Handles:
//! - Yahoo Finance API for nearest-expiry option chains (free)
//! - Local snapshot caching
//! - CSV history of computed levels

pub mod cache;
pub mod history;
pub mod yahoo;

pub use cache::*;
pub use history::*;
pub use yahoo::*;
