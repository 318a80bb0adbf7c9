//! Option chain snapshot
//!
//! Everything the core needs from the quote provider for one expiry.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::{GexError, GexResult};
use super::option::{MarketState, OptionContract, OptionType};

/// Default annual risk-free rate
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.045;

/// Day count used for time to expiry
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Time to expiry in years, floored at one day so same-day expiries stay priceable
pub fn time_to_expiry(expiry: NaiveDate, today: NaiveDate) -> f64 {
    let days = (expiry - today).num_days().max(1);
    days as f64 / DAYS_PER_YEAR
}

/// Snapshot of a single-expiry option chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Underlying symbol
    pub underlying: String,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Underlying spot price
    pub spot: f64,
    /// Risk-free rate used
    pub risk_free_rate: f64,
    /// Time to expiry in years
    pub time_to_expiry: f64,
    /// Calls and puts
    pub contracts: Vec<OptionContract>,
    /// When the provider produced the snapshot
    pub timestamp: DateTime<Utc>,
}

impl ChainSnapshot {
    pub fn new(underlying: impl Into<String>, spot: f64, expiry: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            underlying: underlying.into(),
            expiry,
            spot,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            time_to_expiry: time_to_expiry(expiry, now.date_naive()),
            contracts: Vec::new(),
            timestamp: now,
        }
    }

    pub fn with_contracts(mut self, contracts: Vec<OptionContract>) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn add_contract(&mut self, contract: OptionContract) {
        self.contracts.push(contract);
    }

    /// Market inputs shared across contracts
    pub fn market(&self) -> MarketState {
        MarketState::new(self.spot, self.risk_free_rate, self.time_to_expiry)
    }

    pub fn calls(&self) -> impl Iterator<Item = &OptionContract> {
        self.contracts.iter().filter(|c| c.side == OptionType::Call)
    }

    pub fn puts(&self) -> impl Iterator<Item = &OptionContract> {
        self.contracts.iter().filter(|c| c.side == OptionType::Put)
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Total open interest across both sides
    pub fn total_open_interest(&self) -> u64 {
        self.contracts.iter().map(|c| c.open_interest).sum()
    }

    /// Load an offline snapshot, rejecting files that carry no usable data
    pub fn from_json_file(path: impl AsRef<Path>) -> GexResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let snapshot: ChainSnapshot = serde_json::from_str(&json)
            .map_err(|e| GexError::Serialization(e.to_string()))?;

        if snapshot.is_empty() {
            return Err(GexError::no_data(format!(
                "snapshot {} has no contracts",
                path.display()
            )));
        }
        Ok(snapshot)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> GexResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GexError::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }
}
