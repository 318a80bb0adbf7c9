//! Level Derivation from Gamma Exposure
//!
//! Turns an option chain snapshot into three market-structure levels:
//! - **Zero Gamma**: where net dealer gamma exposure flips sign near spot
//! - **Put Wall**: strike with the largest put-side exposure (support)
//! - **Call Wall**: strike with the largest call-side exposure (resistance)
//!
//! Pipeline:
//! 1. **Relevance filter**: keep strikes within a price band with real open interest
//! 2. **Exposure**: Black-Scholes gamma/vanna per contract, scaled to dollars, summed per strike
//! 3. **Detection**: walls per side, windowed sign-change search for Zero Gamma
//! 4. **Report**: levels, exposure curve, regime and summary metrics

mod config;
mod detection;
mod detector;
mod exposure;
mod filter;
mod report;
mod signal;

pub use config::*;
pub use detection::*;
pub use detector::*;
pub use exposure::*;
pub use filter::*;
pub use report::*;
pub use signal::*;

use serde::{Deserialize, Serialize};

/// Type of detected level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    ZeroGamma,
    PutWall,
    CallWall,
}

impl LevelKind {
    /// User-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            LevelKind::ZeroGamma => "Zero Gamma",
            LevelKind::PutWall => "Put Wall",
            LevelKind::CallWall => "Call Wall",
        }
    }

    /// Short label
    pub fn short_label(&self) -> &'static str {
        match self {
            LevelKind::ZeroGamma => "ZERO_GAMMA",
            LevelKind::PutWall => "PUT_WALL",
            LevelKind::CallWall => "CALL_WALL",
        }
    }
}

/// Gamma regime implied by spot's position relative to Zero Gamma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GammaRegime {
    /// Spot above Zero Gamma: dealers long gamma, volatility dampened
    Suppression,
    /// Spot at or below Zero Gamma: dealers short gamma, moves accelerate
    Expansion,
}

impl GammaRegime {
    pub fn from_spot(spot: f64, zero_gamma: f64) -> Self {
        if spot > zero_gamma {
            GammaRegime::Suppression
        } else {
            GammaRegime::Expansion
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GammaRegime::Suppression => "SUPPRESSION (positive gamma)",
            GammaRegime::Expansion => "EXPANSION (negative gamma)",
        }
    }
}

/// How the Zero Gamma level was obtained
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZeroGammaMethod {
    /// Linear interpolation between two strikes whose net GEX changes sign
    Interpolated {
        lower_strike: f64,
        upper_strike: f64,
        lower_net_gex: f64,
        upper_net_gex: f64,
    },
    /// No sign change near spot; strike with net GEX closest to zero
    NearestToZero { net_gex: f64 },
}

/// Zero Gamma level with provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZeroGamma {
    /// Price level
    pub level: f64,
    pub method: ZeroGammaMethod,
    /// Half-width of the search window actually used, as a fraction of spot
    pub window_pct: f64,
}

impl ZeroGamma {
    pub fn is_interpolated(&self) -> bool {
        matches!(self.method, ZeroGammaMethod::Interpolated { .. })
    }
}

/// The three levels; `None` means the level could not be determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub zero_gamma: Option<f64>,
    pub put_wall: Option<f64>,
    pub call_wall: Option<f64>,
}

impl LevelReport {
    pub fn get(&self, kind: LevelKind) -> Option<f64> {
        match kind {
            LevelKind::ZeroGamma => self.zero_gamma,
            LevelKind::PutWall => self.put_wall,
            LevelKind::CallWall => self.call_wall,
        }
    }

    /// Defined levels, in display order
    pub fn defined(&self) -> Vec<(LevelKind, f64)> {
        [LevelKind::ZeroGamma, LevelKind::PutWall, LevelKind::CallWall]
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|v| (kind, v)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.zero_gamma.is_some() && self.put_wall.is_some() && self.call_wall.is_some()
    }
}
