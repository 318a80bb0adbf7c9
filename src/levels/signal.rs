//! Trade signal derived from the level report
//!
//! Above Zero Gamma price tends to mean-revert toward the walls; below it,
//! moves extend toward the Put Wall.

use serde::{Deserialize, Serialize};

use super::{GammaRegime, GexReport, SignalConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalAction {
    /// Positive gamma, spot sitting on the Put Wall
    StrongBuy,
    /// Positive gamma, reversion toward the Call Wall
    Buy,
    /// Negative gamma momentum
    Sell,
}

impl SignalAction {
    pub fn label(&self) -> &'static str {
        match self {
            SignalAction::StrongBuy => "STRONG BUY (Put Wall bounce)",
            SignalAction::Buy => "BUY (mean reversion)",
            SignalAction::Sell => "SELL (downside momentum)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub action: SignalAction,
    pub regime: GammaRegime,
    pub spot: f64,
    /// Take-profit level
    pub target: f64,
    /// Stop-loss level
    pub stop: f64,
}

impl TradeSignal {
    /// Derive a signal; `None` when a level the decision needs is undefined
    /// or spot sits exactly on Zero Gamma.
    pub fn evaluate(report: &GexReport, config: &SignalConfig) -> Option<Self> {
        let spot = report.spot;
        let zero = report.levels.zero_gamma?;

        if spot > zero {
            let at_put_wall = report
                .levels
                .put_wall
                .filter(|wall| spot <= wall * (1.0 + config.wall_proximity_pct));

            let (action, target, stop) = match at_put_wall {
                Some(wall) => (
                    SignalAction::StrongBuy,
                    zero,
                    wall * (1.0 - config.wall_stop_pct),
                ),
                None => (SignalAction::Buy, report.levels.call_wall?, zero),
            };

            Some(Self {
                action,
                regime: GammaRegime::Suppression,
                spot,
                target,
                stop,
            })
        } else if spot < zero {
            Some(Self {
                action: SignalAction::Sell,
                regime: GammaRegime::Expansion,
                spot,
                target: report.levels.put_wall?,
                stop: zero * (1.0 + config.zero_stop_pct),
            })
        } else {
            None
        }
    }

    /// Percent move from spot to target
    pub fn potential_pct(&self) -> f64 {
        (self.target / self.spot - 1.0) * 100.0
    }

    /// Percent move from spot to stop
    pub fn risk_pct(&self) -> f64 {
        (self.stop / self.spot - 1.0) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChainSnapshot;
    use crate::levels::{ExposureAnalysis, LevelReport};
    use chrono::NaiveDate;

    fn report(spot: f64, zero: Option<f64>, put: Option<f64>, call: Option<f64>) -> GexReport {
        let snapshot = ChainSnapshot::new("QQQ", spot, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        GexReport::assemble(
            &snapshot,
            ExposureAnalysis {
                levels: LevelReport {
                    zero_gamma: zero,
                    put_wall: put,
                    call_wall: call,
                },
                zero_gamma_detail: None,
                profile: Vec::new(),
                contracts_used: 0,
            },
        )
    }

    #[test]
    fn test_buy_toward_call_wall() {
        let r = report(600.0, Some(595.0), Some(580.0), Some(615.0));
        let s = TradeSignal::evaluate(&r, &SignalConfig::default()).unwrap();
        assert_eq!(s.action, SignalAction::Buy);
        assert_eq!(s.regime, GammaRegime::Suppression);
        assert_eq!(s.target, 615.0);
        assert_eq!(s.stop, 595.0);
        assert!(s.potential_pct() > 0.0);
        assert!(s.risk_pct() < 0.0);
    }

    #[test]
    fn test_strong_buy_at_put_wall() {
        let r = report(600.0, Some(590.0), Some(597.0), Some(615.0));
        let s = TradeSignal::evaluate(&r, &SignalConfig::default()).unwrap();
        assert_eq!(s.action, SignalAction::StrongBuy);
        assert_eq!(s.target, 590.0);
        assert!((s.stop - 597.0 * 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_sell_below_zero_gamma() {
        let r = report(600.0, Some(605.0), Some(590.0), Some(615.0));
        let s = TradeSignal::evaluate(&r, &SignalConfig::default()).unwrap();
        assert_eq!(s.action, SignalAction::Sell);
        assert_eq!(s.regime, GammaRegime::Expansion);
        assert_eq!(s.target, 590.0);
        assert!((s.stop - 605.0 * 1.005).abs() < 1e-9);
    }

    #[test]
    fn test_missing_levels_give_no_signal() {
        let config = SignalConfig::default();
        assert!(TradeSignal::evaluate(&report(600.0, None, Some(590.0), Some(615.0)), &config).is_none());
        // Buy needs a Call Wall
        assert!(TradeSignal::evaluate(&report(600.0, Some(595.0), Some(580.0), None), &config).is_none());
        // Sell needs a Put Wall
        assert!(TradeSignal::evaluate(&report(600.0, Some(605.0), None, Some(615.0)), &config).is_none());
        // Exactly on the pivot
        assert!(TradeSignal::evaluate(&report(600.0, Some(600.0), Some(590.0), Some(615.0)), &config).is_none());
    }
}
