//! Stage 1: Relevance Filter
//!
//! Far strikes with leftover open interest carry little gamma but plenty of
//! noise; left in, they produce spurious crossings and walls far from spot.

use crate::core::OptionContract;

use super::FilterConfig;

/// Inclusive strike band `[spot * (1 - pct), spot * (1 + pct)]`
pub fn price_band(spot: f64, price_band_pct: f64) -> (f64, f64) {
    (spot * (1.0 - price_band_pct), spot * (1.0 + price_band_pct))
}

/// Keep contracts near spot with open interest above the minimum.
///
/// Calls and puts go through the same test. Non-positive or non-finite
/// strikes are dropped.
pub fn filter_relevant(
    contracts: &[OptionContract],
    spot: f64,
    price_band_pct: f64,
    min_open_interest: u64,
) -> Vec<OptionContract> {
    let (lower, upper) = price_band(spot, price_band_pct);

    contracts
        .iter()
        .filter(|c| c.strike.is_finite() && c.strike > 0.0)
        .filter(|c| c.strike >= lower && c.strike <= upper)
        .filter(|c| c.open_interest > min_open_interest)
        .copied()
        .collect()
}

/// [`filter_relevant`] driven by a [`FilterConfig`]
pub fn apply_filter(contracts: &[OptionContract], spot: f64, config: &FilterConfig) -> Vec<OptionContract> {
    filter_relevant(contracts, spot, config.price_band_pct, config.min_open_interest)
}
