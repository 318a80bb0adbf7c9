//! LevelDetector - Main facade for the level detection pipeline
//!
//! Combines filter, exposure and detection into a single interface.

use crate::core::{ChainSnapshot, GexResult, MarketState, OptionContract};

use super::{
    aggregate_exposures, apply_filter, compute_exposures, detect_levels_in_profile, ExposureAnalysis,
    GexReport, LevelConfig,
};

/// Runs the full pipeline: filter → Greeks → per-strike exposure → levels
pub struct LevelDetector {
    config: LevelConfig,
}

impl LevelDetector {
    /// Create a new detector with default configuration
    pub fn new() -> Self {
        Self {
            config: LevelConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: LevelConfig) -> Self {
        Self { config }
    }

    /// Get current configuration
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Update configuration
    pub fn set_config(&mut self, config: LevelConfig) {
        self.config = config;
    }

    /// Run the pipeline on a bare contract list
    ///
    /// # Arguments
    /// * `contracts` - Single-expiry chain rows, calls and puts mixed
    /// * `market` - Spot, rate and time to expiry shared by every row
    ///
    /// # Errors
    /// Invalid configuration or market state. Bad individual contracts never
    /// fail the call; they contribute zero exposure or are filtered out.
    pub fn analyze(&self, contracts: &[OptionContract], market: &MarketState) -> GexResult<ExposureAnalysis> {
        self.config.validate()?;
        market.validate()?;

        let relevant = apply_filter(contracts, market.spot, &self.config.filter);
        let rows = compute_exposures(&relevant, market, self.config.parallel_threshold);
        let profile = aggregate_exposures(&rows);
        let (levels, zero_gamma_detail) =
            detect_levels_in_profile(&profile, market.spot, &self.config.zero_gamma);

        tracing::debug!(
            contracts = contracts.len(),
            relevant = relevant.len(),
            strikes = profile.len(),
            zero_gamma = ?levels.zero_gamma,
            put_wall = ?levels.put_wall,
            call_wall = ?levels.call_wall,
            "levels detected"
        );

        Ok(ExposureAnalysis {
            levels,
            zero_gamma_detail,
            profile,
            contracts_used: relevant.len(),
        })
    }

    /// Run the pipeline on a chain snapshot and assemble the report
    pub fn detect(&self, snapshot: &ChainSnapshot) -> GexResult<GexReport> {
        let analysis = self.analyze(&snapshot.contracts, &snapshot.market())?;
        let report = GexReport::assemble(snapshot, analysis);

        tracing::info!(
            underlying = %report.underlying,
            expiry = %report.expiry,
            spot = report.spot,
            net_gex_m = report.net_gex_millions(),
            "gex report ready"
        );
        Ok(report)
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to detect levels with the default configuration
pub fn detect_levels(snapshot: &ChainSnapshot) -> GexResult<GexReport> {
    LevelDetector::new().detect(snapshot)
}

/// Convenience function with custom config
pub fn detect_levels_with_config(snapshot: &ChainSnapshot, config: LevelConfig) -> GexResult<GexReport> {
    LevelDetector::with_config(config).detect(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GexError, OptionType};
    use crate::levels::{is_sign_change, ZeroGammaMethod};
    use chrono::NaiveDate;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn reference_market() -> MarketState {
        MarketState::new(600.0, 0.045, 1.0 / 365.0)
    }

    fn reference_contracts() -> Vec<OptionContract> {
        vec![
            OptionContract::call(605.0, 1000, 0.20),
            OptionContract::put(595.0, 2000, 0.25),
        ]
    }

    #[test]
    fn test_reference_scenario() {
        let analysis = LevelDetector::new()
            .analyze(&reference_contracts(), &reference_market())
            .unwrap();

        assert_eq!(analysis.levels.put_wall, Some(595.0));
        assert_eq!(analysis.levels.call_wall, Some(605.0));

        let zero = analysis.levels.zero_gamma.unwrap();
        assert!(zero > 595.0 && zero < 605.0);
        assert!((zero - 601.355_416_69).abs() < 1e-6, "zero gamma {}", zero);

        let detail = analysis.zero_gamma_detail.unwrap();
        assert!(detail.is_interpolated());
    }

    #[test]
    fn test_single_side_single_strike() {
        let contracts = vec![OptionContract::put(598.0, 500, 0.22)];
        let analysis = LevelDetector::new()
            .analyze(&contracts, &reference_market())
            .unwrap();

        assert_eq!(analysis.levels.put_wall, Some(598.0));
        assert_eq!(analysis.levels.call_wall, None);
        assert_eq!(analysis.levels.zero_gamma, None);
    }

    #[test]
    fn test_empty_chain_has_no_levels() {
        let analysis = LevelDetector::new().analyze(&[], &reference_market()).unwrap();
        assert_eq!(analysis.levels, Default::default());
        assert!(analysis.profile.is_empty());
    }

    #[test]
    fn test_filter_removes_distant_walls() {
        let mut contracts = reference_contracts();
        // Huge but far OTM open interest would otherwise own both walls
        contracts.push(OptionContract::call(700.0, 90_000, 0.35));
        contracts.push(OptionContract::put(500.0, 90_000, 0.45));

        let analysis = LevelDetector::new()
            .analyze(&contracts, &reference_market())
            .unwrap();
        assert_eq!(analysis.levels.call_wall, Some(605.0));
        assert_eq!(analysis.levels.put_wall, Some(595.0));
        assert_eq!(analysis.contracts_used, 2);
    }

    #[test]
    fn test_bad_contract_does_not_abort() {
        let mut contracts = reference_contracts();
        contracts.push(OptionContract::call(600.0, 300, 0.0));

        let analysis = LevelDetector::new()
            .analyze(&contracts, &reference_market())
            .unwrap();
        let at_600 = analysis.profile.iter().find(|p| p.strike == 600.0).unwrap();
        assert_eq!(at_600.net_gex, 0.0);
        assert!(analysis.levels.zero_gamma.is_some());
    }

    #[test]
    fn test_invalid_market_is_error() {
        let market = MarketState::new(-1.0, 0.045, 0.01);
        let err = LevelDetector::new()
            .analyze(&reference_contracts(), &market)
            .unwrap_err();
        assert!(matches!(err, GexError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let mut config = LevelConfig::default();
        config.filter.price_band_pct = -0.1;
        let err = LevelDetector::with_config(config)
            .analyze(&reference_contracts(), &reference_market())
            .unwrap_err();
        assert!(matches!(err, GexError::Config(_)));
    }

    #[test]
    fn test_interpolation_brackets_have_opposite_signs() {
        let contracts: Vec<OptionContract> = (0..21)
            .flat_map(|i| {
                let strike = 590.0 + i as f64;
                [
                    OptionContract::new(strike, 500 + 40 * i as u64, 0.18, OptionType::Call),
                    OptionContract::new(strike, 1300 - 40 * i as u64, 0.22, OptionType::Put),
                ]
            })
            .collect();

        let analysis = LevelDetector::new()
            .analyze(&contracts, &reference_market())
            .unwrap();
        let detail = analysis.zero_gamma_detail.unwrap();
        let ZeroGammaMethod::Interpolated {
            lower_strike,
            upper_strike,
            lower_net_gex,
            upper_net_gex,
        } = detail.method
        else {
            panic!("expected interpolation, got {:?}", detail.method);
        };
        assert!(is_sign_change(lower_net_gex, upper_net_gex));
        assert!(detail.level >= lower_strike && detail.level <= upper_strike);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let snapshot = ChainSnapshot::new("QQQ", 600.0, expiry()).with_contracts(reference_contracts());
        let detector = LevelDetector::new();
        let a = detector.detect(&snapshot).unwrap();
        let b = detector.detect(&snapshot).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.levels.zero_gamma.unwrap().to_bits(),
            b.levels.zero_gamma.unwrap().to_bits()
        );
    }

    #[test]
    fn test_convenience_functions() {
        let snapshot = ChainSnapshot::new("QQQ", 600.0, expiry()).with_contracts(reference_contracts());
        let default = detect_levels(&snapshot).unwrap();
        let tight = detect_levels_with_config(&snapshot, LevelConfig::tight()).unwrap();
        assert_eq!(default.levels, tight.levels);
    }
}
