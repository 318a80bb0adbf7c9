//! Option Greeks and signed exposures
//!
//! Sign and scaling conventions live here as named constants so every
//! exposure in the crate is computed the same way.

use serde::{Deserialize, Serialize};

use super::option::{OptionContract, OptionType};

/// Sign applied to `φ(d1)·d2/σ` when computing vanna.
///
/// `1.0` keeps the un-negated textbook form; flip to `-1.0` for providers
/// that quote vanna as `-φ(d1)·d2/σ`.
pub const VANNA_SIGN: f64 = 1.0;

/// Underlying units covered by one contract
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Underlying move (as a fraction) that dollar gamma is quoted against
pub const DOLLAR_GAMMA_MOVE: f64 = 0.01;

/// Implied vols at or below this are treated as missing
pub const MIN_IMPLIED_VOL: f64 = 1e-6;

/// Per-contract Greeks needed for exposure
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreekResult {
    /// Gamma: d²V/dS²
    pub gamma: f64,
    /// Vanna: d²V/dSdσ (see [`VANNA_SIGN`])
    pub vanna: f64,
}

impl GreekResult {
    pub fn new(gamma: f64, vanna: f64) -> Self {
        Self { gamma, vanna }
    }

    /// Degenerate-input result
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.gamma == 0.0 && self.vanna == 0.0
    }
}

/// Signed financial exposure of one contract
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureRow {
    pub strike: f64,
    pub side: OptionType,
    pub open_interest: u64,
    /// Dollar gamma for a 1% move, signed by side
    pub gex: f64,
    /// Vanna exposure, signed by side
    pub vex: f64,
}

impl ExposureRow {
    /// Scale a contract's Greeks into dollar exposure
    pub fn from_greeks(contract: &OptionContract, greeks: &GreekResult, spot: f64) -> Self {
        let oi = contract.open_interest as f64;
        let direction = contract.side.phi();

        let gex = greeks.gamma * oi * CONTRACT_MULTIPLIER * spot * spot * DOLLAR_GAMMA_MOVE * direction;
        let vex = greeks.vanna * oi * CONTRACT_MULTIPLIER * direction;

        Self {
            strike: contract.strike,
            side: contract.side,
            open_interest: contract.open_interest,
            gex,
            vex,
        }
    }
}
