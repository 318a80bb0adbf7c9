//! Stage 2: Exposure Aggregation
//!
//! Maps each contract to signed dollar exposure, then group-reduces by strike.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{ExposureRow, MarketState, OptionContract, OptionType};
use crate::models::compute_greeks;

/// Fixed-decimal strike used as the grouping key (1/10_000 resolution).
///
/// Calls and puts at "the same" strike can disagree in the last bits once
/// they have been through a quote provider; the key absorbs that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StrikeKey(i64);

impl StrikeKey {
    pub const SCALE: f64 = 10_000.0;

    pub fn from_strike(strike: f64) -> Self {
        Self((strike * Self::SCALE).round() as i64)
    }

    pub fn ticks(&self) -> i64 {
        self.0
    }
}

/// Aggregated exposure at one strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeProfile {
    /// Strike as first seen in the chain
    pub strike: f64,
    pub call_gex: f64,
    pub put_gex: f64,
    /// call_gex + put_gex
    pub net_gex: f64,
    pub call_vex: f64,
    pub put_vex: f64,
    /// call_vex + put_vex
    pub net_vex: f64,
    pub call_open_interest: u64,
    pub put_open_interest: u64,
    /// Number of call rows that landed on this strike
    pub call_contracts: usize,
    /// Number of put rows that landed on this strike
    pub put_contracts: usize,
}

impl StrikeProfile {
    fn empty(strike: f64) -> Self {
        Self {
            strike,
            call_gex: 0.0,
            put_gex: 0.0,
            net_gex: 0.0,
            call_vex: 0.0,
            put_vex: 0.0,
            net_vex: 0.0,
            call_open_interest: 0,
            put_open_interest: 0,
            call_contracts: 0,
            put_contracts: 0,
        }
    }

    fn add(&mut self, row: &ExposureRow) {
        match row.side {
            OptionType::Call => {
                self.call_gex += row.gex;
                self.call_vex += row.vex;
                self.call_open_interest += row.open_interest;
                self.call_contracts += 1;
            }
            OptionType::Put => {
                self.put_gex += row.gex;
                self.put_vex += row.vex;
                self.put_open_interest += row.open_interest;
                self.put_contracts += 1;
            }
        }
        self.net_gex = self.call_gex + self.put_gex;
        self.net_vex = self.call_vex + self.put_vex;
    }

    pub fn has_calls(&self) -> bool {
        self.call_contracts > 0
    }

    pub fn has_puts(&self) -> bool {
        self.put_contracts > 0
    }
}

/// Greeks and exposure for one contract under the given market
pub fn contract_exposure(contract: &OptionContract, market: &MarketState) -> ExposureRow {
    let greeks = compute_greeks(
        market.spot,
        contract.strike,
        market.time_to_expiry,
        market.risk_free_rate,
        contract.implied_vol,
    );
    ExposureRow::from_greeks(contract, &greeks, market.spot)
}

/// Map every contract to its exposure row, preserving input order.
///
/// Chains with at least `parallel_threshold` contracts run on the rayon
/// pool; the output is identical either way.
pub fn compute_exposures(
    contracts: &[OptionContract],
    market: &MarketState,
    parallel_threshold: usize,
) -> Vec<ExposureRow> {
    if contracts.len() >= parallel_threshold {
        contracts
            .par_iter()
            .map(|c| contract_exposure(c, market))
            .collect()
    } else {
        contracts.iter().map(|c| contract_exposure(c, market)).collect()
    }
}

/// Sum exposure rows per strike, ascending by strike
pub fn aggregate_exposures(rows: &[ExposureRow]) -> Vec<StrikeProfile> {
    let mut by_strike: BTreeMap<StrikeKey, StrikeProfile> = BTreeMap::new();

    for row in rows {
        by_strike
            .entry(StrikeKey::from_strike(row.strike))
            .or_insert_with(|| StrikeProfile::empty(row.strike))
            .add(row);
    }

    by_strike.into_values().collect()
}

/// Total net GEX and net VEX across a profile
pub fn profile_totals(profile: &[StrikeProfile]) -> (f64, f64) {
    profile
        .iter()
        .fold((0.0, 0.0), |(gex, vex), p| (gex + p.net_gex, vex + p.net_vex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(strike: f64, side: OptionType, gex: f64, vex: f64) -> ExposureRow {
        ExposureRow {
            strike,
            side,
            open_interest: 10,
            gex,
            vex,
        }
    }

    #[test]
    fn test_strike_key_absorbs_float_noise() {
        assert_eq!(StrikeKey::from_strike(0.1 + 0.2), StrikeKey::from_strike(0.3));
        assert_eq!(StrikeKey::from_strike(600.5).ticks(), 6_005_000);
        assert!(StrikeKey::from_strike(599.5) < StrikeKey::from_strike(600.0));
    }

    #[test]
    fn test_aggregate_joins_calls_and_puts() {
        let rows = vec![
            row(600.0, OptionType::Call, 100.0, 5.0),
            row(600.000_000_000_01, OptionType::Put, -40.0, -2.0),
            row(595.0, OptionType::Put, -70.0, 1.0),
            row(600.0, OptionType::Call, 10.0, 1.0),
        ];
        let profile = aggregate_exposures(&rows);

        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].strike, 595.0);
        assert_eq!(profile[1].strike, 600.0);

        let p = &profile[1];
        assert_eq!(p.call_gex, 110.0);
        assert_eq!(p.put_gex, -40.0);
        assert_eq!(p.net_gex, 70.0);
        assert_eq!(p.net_vex, 4.0);
        assert_eq!(p.call_contracts, 2);
        assert_eq!(p.put_contracts, 1);
        assert_eq!(p.call_open_interest, 20);

        assert!(!profile[0].has_calls());
        assert!(profile[0].has_puts());
    }

    #[test]
    fn test_compute_exposures_signs() {
        let market = MarketState::new(600.0, 0.045, 1.0 / 365.0);
        let contracts = vec![
            OptionContract::call(605.0, 1000, 0.20),
            OptionContract::put(595.0, 2000, 0.25),
        ];
        let rows = compute_exposures(&contracts, &market, usize::MAX);

        assert!(rows[0].gex > 0.0);
        assert!(rows[1].gex < 0.0);
        assert!((rows[0].gex - 16_924_179.437_2).abs() < 1e-2);
        assert!((rows[1].gex + 29_512_348.410_7).abs() < 1e-2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let market = MarketState::new(500.0, 0.04, 5.0 / 365.0);
        let contracts: Vec<OptionContract> = (0..500)
            .map(|i| {
                let strike = 450.0 + i as f64 * 0.25;
                let side = if i % 2 == 0 { OptionType::Call } else { OptionType::Put };
                OptionContract::new(strike, 100 + i as u64, 0.15 + (i % 7) as f64 * 0.01, side)
            })
            .collect();

        let sequential = compute_exposures(&contracts, &market, usize::MAX);
        let parallel = compute_exposures(&contracts, &market, 0);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_profile_totals() {
        let rows = vec![
            row(100.0, OptionType::Call, 30.0, 3.0),
            row(101.0, OptionType::Put, -50.0, -1.0),
        ];
        let (gex, vex) = profile_totals(&aggregate_exposures(&rows));
        assert_eq!(gex, -20.0);
        assert_eq!(vex, 2.0);
    }
}
