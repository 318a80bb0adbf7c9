//! Configuration for level detection pipeline

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{GexError, GexResult};

/// Configuration for level detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Stage 1: Relevance filter
    pub filter: FilterConfig,
    /// Stage 3: Zero Gamma search
    pub zero_gamma: ZeroGammaConfig,
    /// Trade signal thresholds
    pub signal: SignalConfig,
    /// Chains with at least this many filtered contracts compute Greeks in parallel
    /// Default: 2000 (0 = always parallel)
    pub parallel_threshold: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            zero_gamma: ZeroGammaConfig::default(),
            signal: SignalConfig::default(),
            parallel_threshold: 2_000,
        }
    }
}

impl LevelConfig {
    /// Tight settings: narrow band, only well-populated strikes
    pub fn tight() -> Self {
        Self {
            filter: FilterConfig {
                price_band_pct: 0.05,
                min_open_interest: 50,
            },
            ..Default::default()
        }
    }

    /// Wide settings: broad band, thin strikes allowed
    pub fn wide() -> Self {
        Self {
            filter: FilterConfig {
                price_band_pct: 0.10,
                min_open_interest: 5,
            },
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> GexResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: LevelConfig =
            serde_json::from_str(&json).map_err(|e| GexError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GexResult<()> {
        self.filter.validate()?;
        self.zero_gamma.validate()?;
        self.signal.validate()
    }
}

/// Stage 1: Relevance filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Half-width of the strike band around spot, as a fraction of spot
    /// Default: 0.08
    pub price_band_pct: f64,

    /// Contracts need strictly more open interest than this
    /// Default: 20
    pub min_open_interest: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            price_band_pct: 0.08,
            min_open_interest: 20,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> GexResult<()> {
        if !self.price_band_pct.is_finite() || self.price_band_pct <= 0.0 || self.price_band_pct >= 1.0
        {
            return Err(GexError::config(format!(
                "price_band_pct must be in (0, 1), got {}",
                self.price_band_pct
            )));
        }
        Ok(())
    }
}

/// Stage 3: Zero Gamma search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroGammaConfig {
    /// Initial search half-width around spot, as a fraction of spot
    /// Default: 0.02
    pub window_pct: f64,

    /// Window growth factor when too few strikes fall inside
    /// Default: 2.0
    pub widen_factor: f64,

    /// Hard cap on the window half-width
    /// Default: 0.16
    pub max_window_pct: f64,
}

impl Default for ZeroGammaConfig {
    fn default() -> Self {
        Self {
            window_pct: 0.02,
            widen_factor: 2.0,
            max_window_pct: 0.16,
        }
    }
}

impl ZeroGammaConfig {
    pub fn validate(&self) -> GexResult<()> {
        if !self.window_pct.is_finite() || self.window_pct <= 0.0 {
            return Err(GexError::config("window_pct must be positive"));
        }
        if !self.widen_factor.is_finite() || self.widen_factor <= 1.0 {
            return Err(GexError::config("widen_factor must be greater than 1"));
        }
        if !self.max_window_pct.is_finite() || self.max_window_pct < self.window_pct {
            return Err(GexError::config("max_window_pct must be >= window_pct"));
        }
        Ok(())
    }
}

/// Trade signal thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Spot within this fraction above the Put Wall counts as "at the wall"
    /// Default: 0.01
    pub wall_proximity_pct: f64,

    /// Stop distance below the Put Wall for wall bounces
    /// Default: 0.01
    pub wall_stop_pct: f64,

    /// Stop distance above Zero Gamma for shorts
    /// Default: 0.005
    pub zero_stop_pct: f64,

    /// Spot strictly within this fraction of Zero Gamma is testing it
    /// Default: 0.005
    pub zero_gamma_test_pct: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            wall_proximity_pct: 0.01,
            wall_stop_pct: 0.01,
            zero_stop_pct: 0.005,
            zero_gamma_test_pct: 0.005,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> GexResult<()> {
        let all = [
            self.wall_proximity_pct,
            self.wall_stop_pct,
            self.zero_stop_pct,
            self.zero_gamma_test_pct,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(GexError::config("signal thresholds must be non-negative"));
        }
        Ok(())
    }
}
