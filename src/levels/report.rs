//! Report assembly
//!
//! Packages levels and the exposure curve with the summary numbers a
//! dashboard needs. Every derived view returns `None` instead of guessing
//! when the level it depends on is undefined.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ChainSnapshot, MarketState};

use super::{profile_totals, GammaRegime, LevelReport, StrikeProfile, ZeroGamma};

/// Output of the core pipeline for a list of contracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureAnalysis {
    pub levels: LevelReport,
    pub zero_gamma_detail: Option<ZeroGamma>,
    /// Per-strike exposure, ascending by strike
    pub profile: Vec<StrikeProfile>,
    /// Contracts that survived the relevance filter
    pub contracts_used: usize,
}

/// Share of total absolute GEX carried by one strike, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeWeight {
    pub strike: f64,
    pub call_pct: f64,
    pub put_pct: f64,
}

/// Spot approaching Zero Gamma from one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroGammaTest {
    /// Spot just under the pivot; it tends to act as resistance
    FromBelow,
    /// Spot just over the pivot; it tends to act as short-term support
    FromAbove,
}

impl ZeroGammaTest {
    pub fn label(&self) -> &'static str {
        match self {
            ZeroGammaTest::FromBelow => "testing Zero Gamma from below (possible rejection)",
            ZeroGammaTest::FromAbove => "testing Zero Gamma from above (short-term support)",
        }
    }
}

/// Full report for one chain snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GexReport {
    pub underlying: String,
    pub expiry: NaiveDate,
    pub spot: f64,
    pub market: MarketState,
    pub levels: LevelReport,
    pub zero_gamma_detail: Option<ZeroGamma>,
    pub profile: Vec<StrikeProfile>,
    /// Sum of net GEX over the profile
    pub net_gex_total: f64,
    /// Sum of net VEX over the profile
    pub net_vex_total: f64,
    pub contracts_used: usize,
    pub contracts_total: usize,
    /// Snapshot time, not computation time
    pub timestamp: DateTime<Utc>,
}

impl GexReport {
    pub fn assemble(snapshot: &ChainSnapshot, analysis: ExposureAnalysis) -> Self {
        let (net_gex_total, net_vex_total) = profile_totals(&analysis.profile);

        Self {
            underlying: snapshot.underlying.clone(),
            expiry: snapshot.expiry,
            spot: snapshot.spot,
            market: snapshot.market(),
            levels: analysis.levels,
            zero_gamma_detail: analysis.zero_gamma_detail,
            profile: analysis.profile,
            net_gex_total,
            net_vex_total,
            contracts_used: analysis.contracts_used,
            contracts_total: snapshot.contracts.len(),
            timestamp: snapshot.timestamp,
        }
    }

    /// Net GEX in millions of dollars per 1% move
    pub fn net_gex_millions(&self) -> f64 {
        self.net_gex_total / 1e6
    }

    pub fn regime(&self) -> Option<GammaRegime> {
        self.levels
            .zero_gamma
            .map(|zero| GammaRegime::from_spot(self.spot, zero))
    }

    /// Percent distance of spot above the Put Wall (negative when below)
    pub fn put_wall_distance_pct(&self) -> Option<f64> {
        self.levels
            .put_wall
            .filter(|wall| *wall > 0.0)
            .map(|wall| (self.spot - wall) / wall * 100.0)
    }

    /// Spot has broken below the Put Wall
    pub fn below_put_wall(&self) -> Option<bool> {
        self.levels.put_wall.map(|wall| self.spot < wall)
    }

    /// Spot strictly inside `zero * (1 ± pct)` but not on the pivot itself
    pub fn testing_zero_gamma(&self, pct: f64) -> Option<ZeroGammaTest> {
        let zero = self.levels.zero_gamma?;
        if self.spot < zero && self.spot > zero * (1.0 - pct) {
            Some(ZeroGammaTest::FromBelow)
        } else if self.spot > zero && self.spot < zero * (1.0 + pct) {
            Some(ZeroGammaTest::FromAbove)
        } else {
            None
        }
    }

    /// Per-strike share of total absolute GEX
    pub fn strike_weights(&self) -> Vec<StrikeWeight> {
        let total: f64 = self
            .profile
            .iter()
            .map(|p| p.call_gex.abs() + p.put_gex.abs())
            .sum();

        self.profile
            .iter()
            .map(|p| {
                let (call_pct, put_pct) = if total > 0.0 {
                    (p.call_gex.abs() / total * 100.0, p.put_gex.abs() / total * 100.0)
                } else {
                    (0.0, 0.0)
                };
                StrikeWeight {
                    strike: p.strike,
                    call_pct,
                    put_pct,
                }
            })
            .collect()
    }

    /// Profile rows within `pct` of spot, for compact display
    pub fn profile_near_spot(&self, pct: f64) -> Vec<&StrikeProfile> {
        let half_width = self.spot * pct;
        self.profile
            .iter()
            .filter(|p| (p.strike - self.spot).abs() <= half_width)
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionContract;
    use crate::levels::LevelDetector;

    fn report_with(levels: LevelReport, spot: f64) -> GexReport {
        let snapshot = ChainSnapshot::new("QQQ", spot, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        GexReport::assemble(
            &snapshot,
            ExposureAnalysis {
                levels,
                zero_gamma_detail: None,
                profile: Vec::new(),
                contracts_used: 0,
            },
        )
    }

    #[test]
    fn test_regime_and_wall_distance() {
        let report = report_with(
            LevelReport {
                zero_gamma: Some(598.0),
                put_wall: Some(590.0),
                call_wall: Some(610.0),
            },
            600.0,
        );
        assert_eq!(report.regime(), Some(GammaRegime::Suppression));
        let dist = report.put_wall_distance_pct().unwrap();
        assert!((dist - 10.0 / 590.0 * 100.0).abs() < 1e-12);
        assert_eq!(report.below_put_wall(), Some(false));
    }

    #[test]
    fn test_undefined_levels_stay_undefined() {
        let report = report_with(LevelReport::default(), 600.0);
        assert_eq!(report.regime(), None);
        assert_eq!(report.put_wall_distance_pct(), None);
        assert_eq!(report.below_put_wall(), None);
    }

    fn report_near_zero(spot: f64, zero: Option<f64>) -> GexReport {
        report_with(
            LevelReport {
                zero_gamma: zero,
                put_wall: Some(590.0),
                call_wall: Some(610.0),
            },
            spot,
        )
    }

    #[test]
    fn test_zero_gamma_tested_from_either_side() {
        assert_eq!(
            report_near_zero(599.0, Some(600.0)).testing_zero_gamma(0.005),
            Some(ZeroGammaTest::FromBelow)
        );
        assert_eq!(
            report_near_zero(601.0, Some(600.0)).testing_zero_gamma(0.005),
            Some(ZeroGammaTest::FromAbove)
        );
    }

    #[test]
    fn test_zero_gamma_test_band_is_exclusive() {
        // 600 * 0.995 = 597, 600 * 1.005 = 603
        assert_eq!(report_near_zero(597.0, Some(600.0)).testing_zero_gamma(0.005), None);
        assert_eq!(report_near_zero(603.0, Some(600.0)).testing_zero_gamma(0.005), None);
        assert_eq!(report_near_zero(590.0, Some(600.0)).testing_zero_gamma(0.005), None);
        assert_eq!(report_near_zero(600.0, Some(600.0)).testing_zero_gamma(0.005), None);
    }

    #[test]
    fn test_zero_gamma_test_needs_zero_gamma() {
        assert_eq!(report_near_zero(600.0, None).testing_zero_gamma(0.005), None);
    }

    #[test]
    fn test_assembled_from_pipeline() {
        let snapshot = ChainSnapshot::new("QQQ", 600.0, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
            .with_contracts(vec![
                OptionContract::call(605.0, 1000, 0.20),
                OptionContract::put(595.0, 2000, 0.25),
                OptionContract::put(400.0, 9000, 0.60),
            ]);
        let report = LevelDetector::new().detect(&snapshot).unwrap();

        assert_eq!(report.contracts_total, 3);
        assert_eq!(report.contracts_used, 2);
        assert_eq!(report.profile.len(), 2);
        assert!(report.net_gex_total < 0.0);
        assert!((report.net_gex_millions() * 1e6 - report.net_gex_total).abs() < 1e-6);

        let weights = report.strike_weights();
        let total: f64 = weights.iter().map(|w| w.call_pct + w.put_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(weights[0].call_pct, 0.0);

        assert_eq!(report.profile_near_spot(0.005).len(), 0);
        assert_eq!(report.profile_near_spot(0.01).len(), 2);
    }

    #[test]
    fn test_report_json_round_trip() {
        let snapshot = ChainSnapshot::new("QQQ", 600.0, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
            .with_contracts(vec![
                OptionContract::call(605.0, 1000, 0.20),
                OptionContract::put(595.0, 2000, 0.25),
            ]);
        let report = LevelDetector::new().detect(&snapshot).unwrap();

        let json = report.to_json().unwrap();
        let back: GexReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
