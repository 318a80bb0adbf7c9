//! # GEX Levels - Gamma Exposure Market Structure
//!
//! Derives dealer gamma exposure from a single-expiry option chain snapshot
//! and locates three market-structure levels:
//!
//! - **Zero Gamma**: the price where net gamma exposure flips sign near spot
//! - **Put Wall**: the put strike with the largest exposure (support)
//! - **Call Wall**: the call strike with the largest exposure (resistance)
//!
//! ## Key Components
//!
//! - **Black-Scholes**: closed-form gamma and vanna per contract
//! - **Exposure**: dollar gamma per 1% move and vanna exposure, summed by strike
//! - **Relevance filter**: strikes near spot with real open interest only
//! - **Level detection**: walls per side, windowed sign-change search for Zero Gamma
//! - **Data**: Yahoo Finance snapshots, snapshot cache, CSV history log
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gex_levels::prelude::*;
//!
//! // Nearest expiry chain for QQQ
//! let snapshot = YahooClient::new()?.get_nearest_chain("QQQ")?;
//!
//! let report = LevelDetector::new().detect(&snapshot)?;
//! println!("Zero Gamma: {:?}", report.levels.zero_gamma);
//! println!("Put Wall:   {:?}", report.levels.put_wall);
//! println!("Call Wall:  {:?}", report.levels.call_wall);
//! # Ok::<(), gex_levels::GexError>(())
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Model early exercise, dividends or borrow costs
//! - Combine multiple expiries
//! - Stream: every snapshot is computed independently

pub mod core;
pub mod data;
pub mod levels;
pub mod models;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        ChainSnapshot, ExposureRow, GexError, GexResult, GreekResult, MarketState, OptionContract,
        OptionType, CONTRACT_MULTIPLIER, DOLLAR_GAMMA_MOVE, VANNA_SIGN,
    };

    // Data
    pub use crate::data::{
        append_history, read_history, CacheConfig, CachedFetcher, HistoryRecord, SnapshotCache,
        SpotQuote, YahooClient,
    };

    // Models
    pub use crate::models::{compute_greeks, norm_pdf};

    // Level Detection
    pub use crate::levels::{
        aggregate_exposures,
        compute_exposures,
        detect_levels,
        detect_levels_with_config,
        filter_relevant,
        find_call_wall,
        find_put_wall,
        find_zero_gamma,
        ExposureAnalysis,
        FilterConfig,
        GammaRegime,
        GexReport,
        // Config
        LevelConfig,
        // Detector
        LevelDetector,
        LevelKind,
        LevelReport,
        SignalAction,
        SignalConfig,
        StrikeKey,
        StrikeProfile,
        TradeSignal,
        ZeroGamma,
        ZeroGammaConfig,
        ZeroGammaMethod,
        ZeroGammaTest,
    };
}

// Re-export main types at crate root
pub use crate::core::{GexError, GexResult};
pub use crate::levels::{GexReport, LevelDetector, LevelReport};
