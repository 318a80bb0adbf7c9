//! Option contract definitions
//!
//! A single-expiry chain row and the market inputs shared by every row.

use serde::{Deserialize, Serialize};

use super::error::{GexError, GexResult};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Exposure direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }
}

/// One chain row: a strike/side combination for a single expiry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Strike price
    pub strike: f64,
    /// Outstanding contracts
    pub open_interest: u64,
    /// Implied volatility (annualized, decimal)
    pub implied_vol: f64,
    /// Call or put
    pub side: OptionType,
}

impl OptionContract {
    pub fn new(strike: f64, open_interest: u64, implied_vol: f64, side: OptionType) -> Self {
        Self {
            strike,
            open_interest,
            implied_vol,
            side,
        }
    }

    pub fn call(strike: f64, open_interest: u64, implied_vol: f64) -> Self {
        Self::new(strike, open_interest, implied_vol, OptionType::Call)
    }

    pub fn put(strike: f64, open_interest: u64, implied_vol: f64) -> Self {
        Self::new(strike, open_interest, implied_vol, OptionType::Put)
    }

    /// Relative distance of the strike from spot: |K - S| / S
    pub fn moneyness_distance(&self, spot: f64) -> f64 {
        (self.strike - spot).abs() / spot
    }
}

/// Inputs shared by every contract of one computation pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    /// Underlying spot price
    pub spot: f64,
    /// Continuously compounded risk-free rate
    pub risk_free_rate: f64,
    /// Time to expiry in years
    pub time_to_expiry: f64,
}

impl MarketState {
    pub fn new(spot: f64, risk_free_rate: f64, time_to_expiry: f64) -> Self {
        Self {
            spot,
            risk_free_rate,
            time_to_expiry,
        }
    }

    /// Reject states no pipeline step can work with.
    ///
    /// A non-positive time to expiry is accepted: it zeroes the Greeks per
    /// contract instead of failing the whole chain.
    pub fn validate(&self) -> GexResult<()> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(GexError::invalid_input(format!(
                "spot must be positive and finite, got {}",
                self.spot
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(GexError::invalid_input("risk-free rate must be finite"));
        }
        if !self.time_to_expiry.is_finite() {
            return Err(GexError::invalid_input("time to expiry must be finite"));
        }
        Ok(())
    }
}
